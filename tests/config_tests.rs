use clap::{CommandFactory, FromArgMatches, Parser};
use hftrigger::config::{parse_f32_list, FilterConfig};
use hftrigger::error::TriggerError;
use hftrigger::species::{BeautyParticle, CharmParticle};
use rstest::rstest;
use std::io::Write;

#[derive(Parser)]
struct TestCli {
    #[command(flatten)]
    config: FilterConfig,
}

fn parse_cli(args: &[&str]) -> (FilterConfig, clap::ArgMatches) {
    let matches = TestCli::command().get_matches_from(std::iter::once("hftrigger").chain(args.iter().copied()));
    let cli = TestCli::from_arg_matches(&matches).unwrap();
    (cli.config, matches)
}

#[test]
fn test_defaults_resolve() {
    let sel = FilterConfig::default().resolve().unwrap();

    assert_eq!(sel.track_beauty.pt_bins.len(), 7);
    assert_eq!(sel.track_beauty.min_dca_xy.len(), 6);
    assert_eq!(sel.delta_mass_charm[CharmParticle::D0.index()], 0.08);
    assert_eq!(sel.delta_mass_beauty[BeautyParticle::Bs as usize], 0.3);
    assert_eq!(sel.bdt[CharmParticle::Lc.index()].max_bkg, 0.1);
    assert_eq!(sel.pt_threshold_2prong, 8.0);
    assert!(!sel.apply_ml);
}

#[test]
fn test_cli_defaults_match_serde_defaults() {
    let (cli, _) = parse_cli(&[]);
    assert_eq!(cli.resolve().unwrap(), FilterConfig::default().resolve().unwrap());
}

#[test]
fn test_pt_bin_lookup() {
    let sel = FilterConfig::default().resolve().unwrap();
    let cuts = &sel.track_beauty;
    assert_eq!(cuts.find_pt_bin(0.0), Some(0));
    assert_eq!(cuts.find_pt_bin(0.5), Some(1));
    assert_eq!(cuts.find_pt_bin(2.5), Some(4));
    assert_eq!(cuts.find_pt_bin(999.0), Some(5));
    assert_eq!(cuts.find_pt_bin(1000.0), None);
    assert_eq!(cuts.find_pt_bin(-1.0), None);
    assert_eq!(cuts.find_pt_bin(f32::NAN), None);
    assert_eq!(cuts.find_pt_bin(f32::INFINITY), None);
}

#[rstest]
#[case::dca_count("0,1,2", "0.1", "1,1")]
#[case::decreasing_edges("0,2,1", "0,0", "1,1")]
#[case::single_edge("0", "", "")]
#[case::garbage("0,a,2", "0,0", "1,1")]
fn test_bad_track_binning_is_fatal(#[case] bins: &str, #[case] min: &str, #[case] max: &str) {
    let mut config = FilterConfig::default();
    config.beauty.pt_bins_track = bins.to_string();
    config.beauty.min_dca_xy_track = min.to_string();
    config.beauty.max_dca_xy_track = max.to_string();
    assert!(matches!(config.resolve(), Err(TriggerError::Config(_))));
}

#[test]
fn test_wrong_species_count_is_fatal() {
    let mut config = FilterConfig::default();
    config.ml.bdt_min_prompt = "0.5,0.5,0.5,0.5".to_string();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("bdt_min_prompt"));

    let mut config = FilterConfig::default();
    config.mass.delta_mass_beauty = "0.3,0.3,0.3,0.3,0.3".to_string();
    assert!(config.validate().is_err());
}

#[rstest]
#[case::charm("delta_mass_charm")]
#[case::dstar("delta_mass_dstar")]
#[case::gamma("max_delta_mass_gamma_charm")]
fn test_negative_tolerance_is_fatal(#[case] field: &str) {
    let mut config = FilterConfig::default();
    match field {
        "delta_mass_charm" => config.mass.delta_mass_charm = "0.08,-0.01,0.08,0.08,0.08".to_string(),
        "delta_mass_dstar" => config.mass.delta_mass_dstar = -0.04,
        _ => config.mass.max_delta_mass_gamma_charm = f32::NAN,
    }
    assert!(matches!(config.resolve(), Err(TriggerError::Config(_))));
}

#[test]
fn test_parse_list_trims_whitespace() {
    assert_eq!(parse_f32_list(" 1, 2.5 ,3", "x").unwrap(), vec![1.0, 2.5, 3.0]);
}

#[test]
fn test_load_partial_file_keeps_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"{{ "general": {{ "qa_level": 2 }}, "mass": {{ "delta_mass_dstar": 0.02 }} }}"#
    )
    .unwrap();

    let config = FilterConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.general.qa_level, 2);
    assert_eq!(config.mass.delta_mass_dstar, 0.02);
    assert_eq!(config.general.pt_threshold_3prong, 8.0);
    assert_eq!(config.femto.femto_max_relative_momentum, 2.0);
}

#[test]
fn test_load_malformed_file_is_json_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "{{ not json").unwrap();
    assert!(matches!(
        FilterConfig::load_from_file(file.path()),
        Err(TriggerError::Json(_))
    ));
}

#[test]
fn test_cli_overrides_only_explicit_flags() {
    let mut file_config = FilterConfig::default();
    file_config.general.qa_level = 1;
    file_config.general.pt_threshold_2prong = 5.0;
    file_config.femto.femto_max_relative_momentum = 1.5;

    let (cli, matches) = parse_cli(&["--qa-level", "2", "--apply-ml", "--delta-mass-charm", "0.1,0.1,0.1,0.1,0.1"]);
    file_config.merge_from_cli(&cli, &matches);

    assert_eq!(file_config.general.qa_level, 2);
    assert!(file_config.ml.apply_ml);
    assert_eq!(file_config.mass.delta_mass_charm, "0.1,0.1,0.1,0.1,0.1");
    // untouched on the command line, file values survive
    assert_eq!(file_config.general.pt_threshold_2prong, 5.0);
    assert_eq!(file_config.femto.femto_max_relative_momentum, 1.5);
}
