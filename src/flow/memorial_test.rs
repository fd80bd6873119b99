use super::*;

#[test]
fn validate_builds_create_request() {
    let mut form = NewMemorial::new(MemorialKind::Family, "  Christmas 2024 ");
    form.description = Some("   ".to_owned());
    form.timeframe_start = Some("2024-12-20".to_owned());

    let request = form.validate().unwrap();
    assert_eq!(request.title, "Christmas 2024");
    assert_eq!(request.memorial_type, Some(MemorialKind::Family));
    assert_eq!(request.description, None);
    assert_eq!(request.timeframe_start.as_deref(), Some("2024-12-20"));
}

#[test]
fn blank_title_is_rejected() {
    let form = NewMemorial::new(MemorialKind::Tribute, " ");
    let err = form.validate().unwrap_err();
    assert!(matches!(&err, FlowError::Validation(message) if message.contains("In Memory of Grandpa")), "{err:?}");
}

#[test]
fn kinds_parse_and_describe_themselves() {
    for kind in MemorialKind::ALL {
        assert_eq!(kind.as_str().parse::<MemorialKind>().unwrap(), kind);
        assert!(!kind.description().is_empty());
    }
    assert_eq!("Milestone".parse::<MemorialKind>().unwrap().display_name(), "Mile Stone");
    assert!("wedding".parse::<MemorialKind>().is_err());
}
