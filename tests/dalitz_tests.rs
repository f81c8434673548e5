mod common;

use common::{track, two_body};
use hftrigger::consts::{MASS_ELECTRON, MAX_CUTS_PER_MAP};
use hftrigger::dalitz::*;
use hftrigger::error::TriggerError;
use hftrigger::monitoring::{names, CountingSink, NullSink};
use hftrigger::species::PidSpecies;
use hftrigger::track::Track;

fn selector(max_masses: &[f32]) -> DalitzSelector {
    let track_cuts: Vec<Box<dyn TrackCut>> = max_masses
        .iter()
        .map(|_| Box::new(ElectronTrackCut::new("el")) as Box<dyn TrackCut>)
        .collect();
    let pair_cuts: Vec<Box<dyn PairCut>> = max_masses
        .iter()
        .map(|&m| Box::new(PairMassCut::new("mee", m)) as Box<dyn PairCut>)
        .collect();
    DalitzSelector::new(track_cuts, pair_cuts).unwrap()
}

/// An e+e- pair of the given mass.
fn pair(mass: f32) -> (Track, Track) {
    let [p1, p2] = two_body(mass, MASS_ELECTRON, MASS_ELECTRON, 0.5);
    let (mut e1, mut e2) = (track(p1, 1), track(p2, -1));
    // soft pairs sit below the inner-wall momentum floor otherwise
    e1.tpc_inner_param = 0.5;
    e2.tpc_inner_param = 0.5;
    (e1, e2)
}

#[test]
fn test_cut_lists_must_match() {
    let track_cuts: Vec<Box<dyn TrackCut>> = vec![Box::new(ElectronTrackCut::new("a"))];
    let err = DalitzSelector::new(track_cuts, vec![]).err().unwrap();
    assert!(matches!(
        err,
        TriggerError::CutCardinality {
            track_cuts: 1,
            pair_cuts: 0
        }
    ));
}

#[test]
fn test_more_cuts_than_bits_is_rejected() {
    let n = MAX_CUTS_PER_MAP + 1;
    let track_cuts: Vec<Box<dyn TrackCut>> = (0..n)
        .map(|_| Box::new(ElectronTrackCut::new("el")) as Box<dyn TrackCut>)
        .collect();
    let pair_cuts: Vec<Box<dyn PairCut>> = (0..n)
        .map(|_| Box::new(PairMassCut::new("mee", 0.1)) as Box<dyn PairCut>)
        .collect();
    assert!(matches!(
        DalitzSelector::new(track_cuts, pair_cuts),
        Err(TriggerError::Config(_))
    ));
}

#[test]
fn test_pair_bits_set_on_both_legs() {
    let sel = selector(&[0.05, 0.2]);
    assert_eq!(sel.label(1).as_deref(), Some("el_mee"));

    let (e1, e2) = pair(0.1);
    let hadron = Track {
        tpc_nsigma: [8.0, 0.0, 0.0, 0.0],
        ..track(nalgebra::Vector3::new(0.3, 0.2, 0.0), -1)
    };
    let tracks = vec![e1, hadron, e2];

    let track_maps = sel.run_track_selection(&tracks);
    assert_eq!(track_maps, vec![0b11, 0, 0b11]);

    // mee = 0.1 passes only the wider window
    let maps = sel.run_pairing(&tracks, &track_maps);
    assert_eq!(maps, vec![0b10, 0, 0b10]);
}

#[test]
fn test_like_sign_pairs_are_skipped() {
    let sel = selector(&[1.0]);
    let (e1, mut e2) = pair(0.01);
    e2.sign = 1;
    let maps = sel.process(&[e1, e2], false, &NullSink);
    assert_eq!(maps, vec![0, 0]);
}

#[test]
fn test_electron_track_cut_window() {
    let cut = ElectronTrackCut::new("el");
    let base = track(nalgebra::Vector3::new(0.5, 0.0, 0.0), 1);
    assert!(cut.is_selected(&base));

    let mut low_pin = base.clone();
    low_pin.tpc_inner_param = 0.05;
    assert!(!cut.is_selected(&low_pin));

    let mut off_band = base.clone();
    off_band.tpc_nsigma[PidSpecies::Electron.index()] = -3.5;
    assert!(!cut.is_selected(&off_band));

    let mut forward = base;
    forward.eta = 0.95;
    assert!(!cut.is_selected(&forward));
}

#[test]
fn test_qa_counts_tagged_tracks_per_selection() {
    let sel = selector(&[0.05, 0.2]);
    let (e1, e2) = pair(0.01);
    let sink = CountingSink::new();
    let maps = sel.process(&[e1, e2], true, &sink);
    assert_eq!(maps, vec![0b11, 0b11]);

    let stats = sink.get(names::DALITZ_TRACK_STATS);
    assert_eq!(stats.count_at(0.0), 2);
    assert_eq!(stats.count_at(1.0), 2);
}
