use std::collections::BTreeMap;

use cpl_core::{Component, CouplingField, CplError, Direction, FatalKind, Mapping};

fn sample_field() -> CouplingField {
    CouplingField {
        name_out: "SSTOCN".into(),
        field_id: 25,
        grid: 't',
        origin: Component::Ocn,
        dest: Component::Atm,
        nlev: Some(1),
        is_soil: None,
        mapping: Mapping::ConservFracarea,
        mapping_order: Some(2),
        weight: 100,
        is_hybrid: false,
        freq_selector: 0,
        freq_override: None,
    }
}

#[test]
fn coupling_field_round_trip_json() {
    let field = sample_field();
    let json = serde_json::to_string_pretty(&field).expect("serialize");
    assert!(json.contains("\"CONSERV_FRACAREA\""));
    assert!(json.contains("\"OCN\""));
    let decoded: CouplingField = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(decoded, field);
}

#[test]
fn directions_are_yaml_map_keys() {
    let yaml = "ATM2OCN: 3600\nOCN2ATM: 10800\n";
    let parsed: BTreeMap<Direction, u32> = serde_yaml::from_str(yaml).expect("yaml");
    assert_eq!(
        parsed.get(&Direction::new(Component::Atm, Component::Ocn)),
        Some(&3600)
    );
    assert_eq!(
        parsed.get(&Direction::new(Component::Ocn, Component::Atm)),
        Some(&10800)
    );
}

#[test]
fn malformed_direction_is_rejected() {
    let err = "ATMOCN".parse::<Direction>().unwrap_err();
    assert_eq!(err.kind(), Some(FatalKind::RunInfoInvalid));
    let err = "ATM2SEA".parse::<Direction>().unwrap_err();
    assert_eq!(err.kind(), Some(FatalKind::RunInfoInvalid));
    assert_eq!(err.info().context.get("direction").map(String::as_str), Some("ATM2SEA"));
}

#[test]
fn placeholder_is_unresolved() {
    let placeholder = CouplingField::placeholder();
    assert!(placeholder.is_placeholder());
    assert_eq!(placeholder.grid, '?');
    assert_eq!(placeholder.dest.tag(), "?");
    assert!(!sample_field().is_placeholder());
}

#[test]
fn mapping_tokens_resolve_to_identifiers() {
    assert_eq!(Mapping::from_token("CF"), Some(Mapping::ConservFracarea));
    assert_eq!(Mapping::from_token("Bi").map(Mapping::identifier), Some("BILINEA"));
    assert_eq!(Mapping::from_token("XY"), None);
    let component: Result<Component, CplError> = "riv".parse();
    assert_eq!(component.expect("lowercase tag"), Component::Riv);
}
