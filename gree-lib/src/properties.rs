//! Property identifiers understood by Gree air conditioners.
//!
//! Values are passed through untouched; mapping them to modes, fan speeds
//! or swing positions is up to the caller.

/// Power (0/1)
pub const POWER: &str = "Pow";
/// Operating mode code
pub const MODE: &str = "Mod";
/// Target temperature
pub const SET_TEMPERATURE: &str = "SetTem";
/// Fan speed code
pub const FAN_SPEED: &str = "WdSpd";
/// Fresh air valve
pub const AIR: &str = "Air";
/// X-Fan (blow dry)
pub const BLOW: &str = "Blo";
/// Health (ionizer)
pub const HEALTH: &str = "Health";
/// Sleep switch
pub const SLEEP_SWITCH: &str = "SwhSlp";
/// Display light
pub const LIGHT: &str = "Lig";
/// Horizontal swing position
pub const SWING_HORIZONTAL: &str = "SwingLfRig";
/// Vertical swing position
pub const SWING_VERTICAL: &str = "SwUpDn";
pub const QUIET: &str = "Quiet";
pub const TURBO: &str = "Tur";
/// 8 degree heat
pub const STEADY_HEAT: &str = "StHt";
/// Temperature unit (0 = Celsius, 1 = Fahrenheit)
pub const TEMPERATURE_UNIT: &str = "TemUn";
pub const HEAT_COOL_TYPE: &str = "HeatCoolType";
pub const TEMPERATURE_RECORD: &str = "TemRec";
/// Energy saving
pub const SAVE: &str = "SvSt";
pub const SLEEP_MODE: &str = "SlpMod";

/// Built-in room temperature sensor, offset by 40
pub const TEMPERATURE_SENSOR: &str = "TemSen";
pub const ANTI_DIRECT_BLOW: &str = "AntiDirectBlow";
/// Automatic display light sensor
pub const LIGHT_SENSOR: &str = "LigSen";

/// Properties polled on every status update, in request order
pub const DEFAULT_STATUS: &[&str] = &[
    POWER,
    MODE,
    SET_TEMPERATURE,
    FAN_SPEED,
    AIR,
    BLOW,
    HEALTH,
    SLEEP_SWITCH,
    LIGHT,
    SWING_HORIZONTAL,
    SWING_VERTICAL,
    QUIET,
    TURBO,
    STEADY_HEAT,
    TEMPERATURE_UNIT,
    HEAT_COOL_TYPE,
    TEMPERATURE_RECORD,
    SAVE,
    SLEEP_MODE,
];

/// Properties only some models have; discover them with `probe`
pub const OPTIONAL_FEATURES: &[&str] = &[TEMPERATURE_SENSOR, ANTI_DIRECT_BLOW, LIGHT_SENSOR];
