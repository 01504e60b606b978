use cpl_core::{Component, CouplingField, CplError, FatalKind, Mapping};
use cpl_namcouple::{FieldNameResolver, ResolveContext, StashCode};
use tempfile::tempdir;

mod common;

fn hybrid(name: &str) -> CouplingField {
    let mut field = common::field(name, Component::Atm, Component::Jnr, Mapping::Bilinear, 10);
    field.is_hybrid = true;
    field.grid = '?';
    field.nlev = None;
    field.is_soil = None;
    field
}

#[test]
fn atmos_ocean_names_swap_component_tokens() -> Result<(), CplError> {
    let info = common::run_info();
    let mut ctx = ResolveContext::new(&info);
    let mut field = common::field(
        "OCN_ICEFRC_cat02",
        Component::Ocn,
        Component::Atm,
        Mapping::ConservFracarea,
        1,
    );
    field.nlev = None;
    field.is_soil = None;

    let names = FieldNameResolver::for_field(&field).resolve(&mut field, &mut ctx)?;
    assert_eq!(names.target, "ATM_ICEFRC_cat02");
    assert_eq!(names.cf_key, "ICEFRC");
    assert_eq!(names.cf.long_name, "sea_ice_area_fraction");
    assert_eq!(field.nlev, Some(1));
    assert_eq!(field.is_soil, Some(false));
    assert!(!ctx.stash.is_loaded());
    Ok(())
}

#[test]
fn unknown_cf_key_degrades_to_placeholder() -> Result<(), CplError> {
    let info = common::run_info();
    let mut ctx = ResolveContext::new(&info);
    let mut field =
        common::field("ATM_MYSTERY", Component::Atm, Component::Ocn, Mapping::Bilinear, 1);
    let names = FieldNameResolver::AtmosOcean.resolve(&mut field, &mut ctx)?;
    assert!(names.cf.is_placeholder());
    assert_eq!(names.cf_key, "MYSTERY");
    Ok(())
}

#[test]
fn hybrid_fields_read_stashmaster() -> Result<(), CplError> {
    let dir = tempdir().expect("tempdir");
    let info = common::with_stashmaster(common::run_info(), dir.path());
    let mut ctx = ResolveContext::new(&info);

    let mut temperature = hybrid("A03236");
    let names = FieldNameResolver::for_field(&temperature).resolve(&mut temperature, &mut ctx)?;
    assert!(ctx.stash.is_loaded());
    assert_eq!(names.target, "J03236");
    assert_eq!(names.cf_key, "m01s03i236");
    assert_eq!(names.cf.long_name, "TEMPERATURE AT 1.5M");
    assert_eq!(names.cf.unit, "unknown");
    assert_eq!(names.stash, Some(StashCode::new(3, 236)));
    assert_eq!((temperature.grid, temperature.nlev), ('t', Some(1)));

    let mut wind = hybrid("A00003");
    FieldNameResolver::Hybrid.resolve(&mut wind, &mut ctx)?;
    assert_eq!((wind.grid, wind.nlev), ('v', Some(85)));

    let mut soil = hybrid("A08223");
    FieldNameResolver::Hybrid.resolve(&mut soil, &mut ctx)?;
    assert_eq!((soil.grid, soil.nlev, soil.is_soil), ('t', Some(4), Some(true)));
    Ok(())
}

#[test]
fn hybrid_failures_are_fatal() {
    let dir = tempdir().expect("tempdir");
    let info = common::with_stashmaster(common::run_info(), dir.path());
    let mut ctx = ResolveContext::new(&info);
    let mut kind = |name: &str| {
        let mut field = hybrid(name);
        FieldNameResolver::Hybrid
            .resolve(&mut field, &mut ctx)
            .err()
            .and_then(|err| err.kind())
    };
    assert_eq!(kind("A00150"), Some(FatalKind::UnrecognisedGrid));
    assert_eq!(kind("A00004"), Some(FatalKind::UnrecognisedLevel));
    assert_eq!(kind("A08224"), Some(FatalKind::UnrecognisedLevel));
    assert_eq!(kind("A99999"), Some(FatalKind::NotFoundStashCode));
    assert_eq!(kind("J03236"), Some(FatalKind::NotFoundStashCode));
    assert_eq!(kind("A3236"), Some(FatalKind::NotFoundStashCode));
}

#[test]
fn missing_stashmaster_file_is_reported() {
    let dir = tempdir().expect("tempdir");
    let mut info = common::run_info();
    info.stashmaster_dir = Some(dir.path().to_path_buf());
    let mut ctx = ResolveContext::new(&info);
    let mut field = hybrid("A03236");
    let err = FieldNameResolver::Hybrid
        .resolve(&mut field, &mut ctx)
        .unwrap_err();
    assert_eq!(err.kind(), Some(FatalKind::MissingStashmaster));
    assert_eq!(err.exit_code(), 24);
}
