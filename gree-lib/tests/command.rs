mod common;
use common::*;
use gree_lib::ModeCode;

#[tokio::test]
async fn test_command_payload_pairs_names_and_values() {
    let (device, transport) = bound_device(ProtocolVersion::V1Ecb);
    transport.push_reply(device_reply(
        &device_cipher(ProtocolVersion::V1Ecb),
        &json!({"t": "res", "mac": DEVICE_ID, "r": 200, "opt": ["Pow", "SetTem"], "p": [1, 24], "val": [1, 24]}),
    ));

    let ack = device
        .send_command(&["Pow", "SetTem"], vec![true.into(), 24u8.into()])
        .await
        .unwrap();
    assert_eq!(ack.result_code(), Some(200));
    assert_eq!(ack.raw["val"], json!([1, 24]));

    let request = transport.last_request();
    assert_eq!(outer(&request)["i"], 0);
    assert_eq!(
        inner(&device_cipher(ProtocolVersion::V1Ecb), &request),
        json!({"opt": ["Pow", "SetTem"], "p": [1, 24], "t": "cmd"})
    );
}

#[tokio::test]
async fn test_v2_command_carries_tag() {
    let (device, transport) = bound_device(ProtocolVersion::V2Gcm);
    transport.push_reply(device_reply(
        &device_cipher(ProtocolVersion::V2Gcm),
        &json!({"t": "res", "r": 200}),
    ));

    device.send_command(&["Lig"], vec![0.into()]).await.unwrap();

    let request = transport.last_request();
    assert!(outer(&request)["tag"].is_string());
    assert_eq!(
        inner(&device_cipher(ProtocolVersion::V2Gcm), &request),
        json!({"opt": ["Lig"], "p": [0], "t": "cmd"})
    );
}

#[tokio::test]
async fn test_ack_without_result_code() {
    let (device, transport) = bound_device(ProtocolVersion::V1Ecb);
    transport.push_reply(device_reply(&device_cipher(ProtocolVersion::V1Ecb), &json!({"t": "res"})));

    let ack = device.send_command(&["Pow"], vec![1.into()]).await.unwrap();
    assert_eq!(ack.result_code(), None);
}

#[tokio::test]
async fn test_mismatched_lengths_send_nothing() {
    let (device, transport) = bound_device(ProtocolVersion::V1Ecb);

    let err = device
        .send_command(&["Pow", "Mod"], vec![1.into()])
        .await
        .unwrap_err();
    assert!(matches!(err, GreeError::CommandLengthMismatch { names: 2, values: 1 }));
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_non_finite_value_sends_nothing() {
    let (device, transport) = bound_device(ProtocolVersion::V1Ecb);

    for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let err = device.send_command(&["SetTem"], vec![bad.into()]).await.unwrap_err();
        assert!(matches!(err, GreeError::UnsupportedValue(_)));
        assert_eq!(err.kind(), ErrorKind::UnsupportedValue);
    }
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_unbound_command_sends_nothing() {
    let (device, transport) = unbound_device(ProtocolVersion::V1Ecb);

    let err = device.send_command(&["Pow"], vec![1.into()]).await.unwrap_err();
    assert!(matches!(err, GreeError::NotBound));
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_mode_and_json_values() {
    enum Mode {
        Cool,
        Heat,
    }

    impl ModeCode for Mode {
        fn code(&self) -> i64 {
            match self {
                Mode::Cool => 1,
                Mode::Heat => 4,
            }
        }
    }

    let (device, transport) = bound_device(ProtocolVersion::V1Ecb);
    transport.push_reply(device_reply(&device_cipher(ProtocolVersion::V1Ecb), &json!({"r": 200})));
    transport.push_reply(device_reply(&device_cipher(ProtocolVersion::V1Ecb), &json!({"r": 200})));

    let values = vec![
        CommandValue::from_mode(&Mode::Heat),
        CommandValue::try_from(json!(22.5)).unwrap(),
        CommandValue::from("auto"),
    ];
    device.send_command(&["Mod", "SetTem", "Note"], values).await.unwrap();
    assert_eq!(
        inner(&device_cipher(ProtocolVersion::V1Ecb), &transport.last_request())["p"],
        json!([4, 22.5, "auto"])
    );

    device
        .send_command(&["Mod"], vec![CommandValue::from_mode(&Mode::Cool)])
        .await
        .unwrap();
    assert_eq!(
        inner(&device_cipher(ProtocolVersion::V1Ecb), &transport.last_request())["p"],
        json!([1])
    );
}

#[test]
fn test_unsupported_json_values_rejected() {
    for value in [json!(null), json!([1]), json!({"a": 1})] {
        let err = CommandValue::try_from(value).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedValue);
    }
}
