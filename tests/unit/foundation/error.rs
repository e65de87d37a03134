use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        LightrailError::format("x")
            .to_string()
            .contains("format error:")
    );
    assert!(
        LightrailError::acquisition("x")
            .to_string()
            .contains("acquisition error:")
    );
    assert!(
        LightrailError::invalid_parameter("x")
            .to_string()
            .contains("invalid parameter:")
    );
    assert_eq!(LightrailError::Cancelled.to_string(), "cancelled");
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = LightrailError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert!(!err.is_cancelled());
}

#[test]
fn cancelled_is_detected() {
    assert!(LightrailError::Cancelled.is_cancelled());
    assert!(!LightrailError::format("x").is_cancelled());
}
