//! Per-event trigger evaluation.
//!
//! Candidates go through preselection, the optional BDT gate, the charm mass
//! window and the tighter beauty-daughter window. The trigger rules then
//! combine the surviving candidates with the selected tracks and photons.

use super::types::{CandidateTags, EventDecision, THREE_PRONG_SPECIES};
use super::HfFilter;
use crate::calibration::PidCalibration;
use crate::combinatorics::{are_independent, compute_number_of_candidates};
use crate::consts::{MASS_B0, MASS_D0, MASS_DSTAR, MASS_GAMMA, MASS_PION};
use crate::kinematics::{compute_relative_momentum, inv_mass, pt_of};
use crate::ml::is_bdt_selected;
use crate::monitoring::names;
use crate::selectors::*;
use crate::species::{BachelorTag, BeautyParticle, CharmParticle, HfTrigger};
use crate::track::{Event, GammaCandidate, ThreeProng, Track, TwoProng};
use itertools::Itertools;
use nalgebra::Vector3;
use tracing::debug;

/// A candidate that passed the charm mass window under one species.
struct SelectedCharm {
    candidate: usize,
    tags: CandidateTags,
    daughters: Vec<usize>,
    /// Prong momenta in the order of the mass hypotheses.
    prongs: Vec<Vector3<f64>>,
    momentum: Vector3<f64>,
    pt: f32,
    /// Sign of the same-charge prongs; 0 for neutral candidates.
    charge: i8,
}

impl SelectedCharm {
    fn is_two_prong(&self) -> bool {
        self.tags.particle.is_two_prong()
    }
}

fn sum_momenta(prongs: &[Vector3<f64>]) -> Vector3<f64> {
    prongs.iter().fold(Vector3::zeros(), |acc, p| acc + p)
}

fn mass_series(qa_level: u8, particle: &'static str) -> Option<String> {
    (qa_level > 0).then(|| names::mass_vs_pt(particle))
}

/// Returns false when the BDT rejects the candidate. Species without a
/// model are not gated.
fn bdt_gate(
    filter: &HfFilter,
    particle: CharmParticle,
    features: Option<&[f32]>,
    pt: f32,
    tags: &mut CandidateTags,
) -> bool {
    let sel = &filter.selections;
    if !sel.apply_ml {
        return true;
    }
    let model = match &filter.models[particle.index()] {
        Some(m) => m,
        None => return true,
    };
    let features = match features {
        Some(f) => f,
        None => return false,
    };

    let scores = match model.predict(features) {
        Ok(Some(scores)) => scores,
        Ok(None) => return false,
        Err(e) => {
            debug!("{}", e);
            return false;
        }
    };

    if sel.qa_level > 0 {
        let name: &'static str = particle.into();
        for (class, score) in scores.iter().enumerate() {
            filter.sink.fill_2d(&names::bdt_score(name, class), pt, *score);
        }
    }

    tags.bdt = is_bdt_selected(&scores, &sel.bdt[particle.index()]);
    tags.bdt != 0
}

fn evaluate_two_prong(
    filter: &HfFilter,
    calib: Option<&PidCalibration>,
    tracks: &[Track],
    index: usize,
    cand: &TwoProng,
) -> (CandidateTags, Option<SelectedCharm>) {
    let sel = &filter.selections;
    let particle = CharmParticle::D0;
    let mut tags = CandidateTags::new(particle);

    let (pos, neg) = match (tracks.get(cand.pos), tracks.get(cand.neg)) {
        (Some(p), Some(n)) if p.sign > 0 && n.sign < 0 => (p, n),
        _ => {
            debug!("Two-prong {} has missing or mis-signed prongs", index);
            return (tags, None);
        }
    };

    tags.preselection = is_dzero_preselected(pos, neg, &sel.pid, calib);
    if tags.preselection == 0 {
        return (tags, None);
    }

    let prongs = vec![pos.momentum(), neg.momentum()];
    let momentum = sum_momenta(&prongs);
    let pt = pt_of(&momentum);

    if !bdt_gate(filter, particle, cand.features.as_deref(), pt, &mut tags) {
        return (tags, None);
    }

    let series = mass_series(sel.qa_level, particle.into());
    let qa = series.as_deref().map(|s| MassQa {
        sink: filter.sink.as_ref(),
        series: s,
    });

    let i = particle.index();
    tags.charm_mass = is_selected_dzero_in_mass_range(
        prongs[0],
        prongs[1],
        pt,
        tags.preselection,
        sel.delta_mass_charm[i],
        qa.as_ref(),
    );
    if tags.charm_mass == 0 {
        return (tags, None);
    }
    tags.beauty_mass = is_selected_dzero_in_mass_range(
        prongs[0],
        prongs[1],
        pt,
        tags.charm_mass,
        sel.delta_mass_charm_for_beauty[i],
        None,
    );

    let selected = SelectedCharm {
        candidate: index,
        tags,
        daughters: vec![cand.pos, cand.neg],
        prongs,
        momentum,
        pt,
        charge: 0,
    };
    (tags, Some(selected))
}

#[allow(clippy::too_many_arguments)]
fn three_prong_mass_window(
    particle: CharmParticle,
    p_same_first: Vector3<f64>,
    p_same_second: Vector3<f64>,
    p_opposite: Vector3<f64>,
    pt: f32,
    is_selected: u8,
    delta_mass: f32,
    qa: Option<&MassQa>,
) -> u8 {
    match particle {
        CharmParticle::Dplus => {
            is_selected
                & is_selected_dplus_in_mass_range(p_same_first, p_same_second, p_opposite, pt, delta_mass, qa)
        }
        CharmParticle::Ds => {
            is_selected_ds_in_mass_range(p_same_first, p_same_second, p_opposite, pt, is_selected, delta_mass, qa)
        }
        CharmParticle::Lc => {
            is_selected_lc_in_mass_range(p_same_first, p_same_second, p_opposite, pt, is_selected, delta_mass, qa)
        }
        CharmParticle::Xic => {
            is_selected_xic_in_mass_range(p_same_first, p_same_second, p_opposite, pt, is_selected, delta_mass, qa)
        }
        CharmParticle::D0 => 0,
    }
}

fn evaluate_three_prong(
    filter: &HfFilter,
    calib: Option<&PidCalibration>,
    tracks: &[Track],
    index: usize,
    cand: &ThreeProng,
) -> ([CandidateTags; 4], Vec<SelectedCharm>) {
    let sel = &filter.selections;
    let mut all_tags = THREE_PRONG_SPECIES.map(CandidateTags::new);
    let mut selected = Vec::new();

    let prong_tracks = (
        tracks.get(cand.same_first),
        tracks.get(cand.same_second),
        tracks.get(cand.opposite),
    );
    let (same_first, same_second, opposite) = match prong_tracks {
        (Some(a), Some(b), Some(o)) if a.sign.signum() == b.sign.signum() && is_opposite_charge(a.sign, o.sign) => {
            (a, b, o)
        }
        _ => {
            debug!("Three-prong {} has missing or mis-signed prongs", index);
            return (all_tags, selected);
        }
    };

    let (p_first, p_second, p_opposite) = (same_first.momentum(), same_second.momentum(), opposite.momentum());
    let prongs = vec![p_first, p_opposite, p_second];
    let momentum = sum_momenta(&prongs);
    let pt = pt_of(&momentum);

    for (tags, particle) in all_tags.iter_mut().zip(THREE_PRONG_SPECIES) {
        tags.preselection = match particle {
            CharmParticle::Dplus => is_dplus_preselected(opposite, &sel.pid, calib),
            CharmParticle::Ds => is_ds_preselected(same_first, same_second, opposite, &sel.pid, calib),
            CharmParticle::Lc | CharmParticle::Xic => {
                is_charm_baryon_preselected(same_first, same_second, opposite, &sel.pid, calib)
            }
            CharmParticle::D0 => 0,
        };
        if tags.preselection == 0 {
            continue;
        }

        if !bdt_gate(filter, particle, cand.features.as_deref(), pt, tags) {
            continue;
        }

        let series = mass_series(sel.qa_level, particle.into());
        let qa = series.as_deref().map(|s| MassQa {
            sink: filter.sink.as_ref(),
            series: s,
        });

        let i = particle.index();
        tags.charm_mass = three_prong_mass_window(
            particle,
            p_first,
            p_second,
            p_opposite,
            pt,
            tags.preselection,
            sel.delta_mass_charm[i],
            qa.as_ref(),
        );
        if tags.charm_mass == 0 {
            continue;
        }
        tags.beauty_mass = three_prong_mass_window(
            particle,
            p_first,
            p_second,
            p_opposite,
            pt,
            tags.charm_mass,
            sel.delta_mass_charm_for_beauty[i],
            None,
        );

        selected.push(SelectedCharm {
            candidate: index,
            tags: *tags,
            daughters: vec![cand.same_first, cand.opposite, cand.same_second],
            prongs: prongs.clone(),
            momentum,
            pt,
            charge: same_first.sign,
        });
    }

    (all_tags, selected)
}

/// Charm + pion mass against the window of the beauty mother.
fn is_beauty_in_mass_range(filter: &HfFilter, charm: &SelectedCharm, bachelor: &Track) -> bool {
    let sel = &filter.selections;
    let mother = charm.tags.particle.beauty_mother();

    let p_beauty = charm.momentum + bachelor.momentum();
    let mass = inv_mass(
        &[charm.momentum, bachelor.momentum()],
        &[charm.tags.particle.mass(), MASS_PION],
    );
    if sel.qa_level > 0 {
        filter
            .sink
            .fill_2d(&names::mass_vs_pt(mother.into()), pt_of(&p_beauty), mass);
    }

    (mass - mother.mass()).abs() < sel.delta_mass_beauty[mother.index()]
}

/// Signs come straight from the input and may be any `i8`.
#[inline(always)]
fn is_opposite_charge(a: i8, b: i8) -> bool {
    (a as i16) * (b as i16) < 0
}

/// D0 (pi+ K-) pairs with a negative pion, D0bar with a positive one;
/// charged charm hadrons pair with a pion of opposite charge.
fn is_bachelor_charge_compatible(charm: &SelectedCharm, sign: i8) -> bool {
    if charm.is_two_prong() {
        (charm.tags.beauty_mass & preselection::BIT_D0 != 0 && sign < 0)
            || (charm.tags.beauty_mass & preselection::BIT_D0BAR != 0 && sign > 0)
    } else {
        is_opposite_charge(sign, charm.charge)
    }
}

fn has_beauty_partner(filter: &HfFilter, tracks: &[Track], bachelors: &[BachelorTag], charm: &SelectedCharm) -> bool {
    if charm.tags.beauty_mass == 0 {
        return false;
    }
    tracks.iter().enumerate().any(|(i, track)| {
        bachelors[i] == BachelorTag::Regular
            && !charm.daughters.contains(&i)
            && is_bachelor_charge_compatible(charm, track.sign)
            && is_beauty_in_mass_range(filter, charm, track)
    })
}

/// B0 -> D*- pi+ with D*- -> D0bar pi- (and charge conjugate).
fn has_dstar_beauty_partner(
    filter: &HfFilter,
    tracks: &[Track],
    bachelors: &[BachelorTag],
    charm: &SelectedCharm,
) -> bool {
    let sel = &filter.selections;
    if !charm.is_two_prong() || charm.tags.beauty_mass == 0 {
        return false;
    }
    let delta_b0 = sel.delta_mass_beauty[BeautyParticle::B0toDStar.index()];

    for (i, soft) in tracks.iter().enumerate() {
        if bachelors[i] == BachelorTag::Rejected || charm.daughters.contains(&i) {
            continue;
        }
        // D*+ -> D0 pi+, D*- -> D0bar pi-
        let bit = if soft.sign > 0 {
            preselection::BIT_D0
        } else {
            preselection::BIT_D0BAR
        };
        if charm.tags.beauty_mass & bit == 0 {
            continue;
        }
        let masses = match hypothesis_masses(CharmParticle::D0, bit.trailing_zeros() as u8) {
            Some(m) => m,
            None => continue,
        };

        let mass_d0 = inv_mass(&charm.prongs, masses);
        let mass_dstar = inv_mass(
            &[charm.prongs[0], charm.prongs[1], soft.momentum()],
            &[masses[0], masses[1], MASS_PION],
        );
        if ((mass_dstar - mass_d0) - (MASS_DSTAR - MASS_D0)).abs() > sel.delta_mass_dstar {
            continue;
        }

        let p_dstar = charm.momentum + soft.momentum();
        let found = tracks.iter().enumerate().any(|(j, bachelor)| {
            if j == i || bachelors[j] != BachelorTag::Regular || charm.daughters.contains(&j) {
                return false;
            }
            if !is_opposite_charge(bachelor.sign, soft.sign) {
                return false;
            }
            let mass = inv_mass(&[p_dstar, bachelor.momentum()], &[MASS_DSTAR, MASS_PION]);
            (mass - MASS_B0).abs() < delta_b0
        });
        if found {
            return true;
        }
    }

    false
}

/// Mass difference between charm + photon and charm alone, per surviving
/// hypothesis.
fn gamma_charm_mass_differences<'a>(
    charm: &'a SelectedCharm,
    gamma: &'a GammaCandidate,
) -> impl Iterator<Item = f32> + 'a {
    (0..u8::BITS as u8)
        .filter(move |&bit| charm.tags.charm_mass & (1 << bit) != 0)
        .filter_map(move |bit| hypothesis_masses(charm.tags.particle, bit))
        .map(move |masses| {
            let mass_charm = inv_mass(&charm.prongs, masses);

            let mut momenta = charm.prongs.clone();
            momenta.push(gamma.momentum());
            let mut all_masses = masses.to_vec();
            all_masses.push(MASS_GAMMA);

            inv_mass(&momenta, &all_masses) - mass_charm
        })
}

pub fn process_event(filter: &HfFilter, event: &Event) -> EventDecision {
    let sel = &filter.selections;
    let sink = filter.sink.as_ref();
    let calib = filter.active_calibration();
    let tracks = &event.tracks;
    let mut decision = EventDecision::new(event.id);

    // Track-level flags
    let bachelors: Vec<BachelorTag> = tracks
        .iter()
        .map(|t| {
            is_selected_track_for_beauty(t, sel.pt_min_soft_pion, sel.pt_min_beauty_bachelor, &sel.track_beauty)
        })
        .collect();
    let femto_protons: Vec<bool> = tracks
        .iter()
        .map(|t| is_selected_proton_for_femto(t, &sel.femto, calib, sel.qa_level, sink))
        .collect();

    let gammas: Vec<&GammaCandidate> = event
        .gammas
        .iter()
        .filter(|g| is_selected_gamma(g, sel.qa_level, sink))
        .collect();
    decision.n_selected_gammas = gammas.len();

    if let Some(cuts) = &filter.calo_cuts {
        decision.n_calo_photons = cuts.select(&event.calo_clusters, sink).len();
    }
    if let Some(dalitz) = &filter.dalitz {
        decision.dalitz_maps = dalitz.process(tracks, sel.qa_level > 1, sink);
    }

    // Candidates
    let mut charm_2p = Vec::new();
    for (index, cand) in event.two_prongs.iter().enumerate() {
        let (tags, selected) = evaluate_two_prong(filter, calib, tracks, index, cand);
        decision.two_prongs.push(tags);
        charm_2p.extend(selected);
    }
    let mut charm_3p = Vec::new();
    for (index, cand) in event.three_prongs.iter().enumerate() {
        let (tags, selected) = evaluate_three_prong(filter, calib, tracks, index, cand);
        decision.three_prongs.push(tags);
        charm_3p.extend(selected);
    }

    // High pT
    if charm_2p.iter().any(|c| c.pt > sel.pt_threshold_2prong) {
        decision.set(HfTrigger::HighPt2P);
    }
    if charm_3p.iter().any(|c| c.pt > sel.pt_threshold_3prong) {
        decision.set(HfTrigger::HighPt3P);
    }

    // Beauty
    for charm in &charm_2p {
        if !decision.has(HfTrigger::Beauty3P) && has_beauty_partner(filter, tracks, &bachelors, charm) {
            decision.set(HfTrigger::Beauty3P);
        }
        if !decision.has(HfTrigger::Beauty4P) && has_dstar_beauty_partner(filter, tracks, &bachelors, charm) {
            decision.set(HfTrigger::Beauty4P);
        }
    }
    if charm_3p
        .iter()
        .any(|charm| has_beauty_partner(filter, tracks, &bachelors, charm))
    {
        decision.set(HfTrigger::Beauty4P);
    }

    // Femtoscopy
    for charm in charm_2p.iter().chain(&charm_3p) {
        for (i, track) in tracks.iter().enumerate() {
            if !femto_protons[i] || charm.daughters.contains(&i) {
                continue;
            }
            let kstar = compute_relative_momentum(track, charm.momentum, charm.tags.particle.mass());
            if sel.qa_level > 0 {
                sink.fill_1d(names::KSTAR, kstar);
            }
            if kstar < sel.femto.femto_max_relative_momentum {
                decision.femto_kstar.push(kstar);
                decision.set(if charm.is_two_prong() {
                    HfTrigger::Femto2P
                } else {
                    HfTrigger::Femto3P
                });
            }
        }
    }

    // Double charm
    let daughters_2p: Vec<Vec<usize>> = charm_2p.iter().map(|c| c.daughters.clone()).collect();
    let daughters_3p: Vec<Vec<usize>> = charm_3p
        .iter()
        .dedup_by(|a, b| a.candidate == b.candidate)
        .map(|c| c.daughters.clone())
        .collect();
    if compute_number_of_candidates(&daughters_2p) >= 2 {
        decision.set(HfTrigger::DoubleCharm2P);
    }
    if compute_number_of_candidates(&daughters_3p) >= 2 {
        decision.set(HfTrigger::DoubleCharm3P);
    }
    if daughters_2p
        .iter()
        .cartesian_product(&daughters_3p)
        .any(|(a, b)| are_independent(a, b))
    {
        decision.set(HfTrigger::DoubleCharmMix);
    }

    // Charm + photon
    for charm in charm_2p.iter().chain(&charm_3p) {
        let trigger = if charm.is_two_prong() {
            HfTrigger::GammaCharm2P
        } else {
            HfTrigger::GammaCharm3P
        };
        if decision.has(trigger) {
            continue;
        }
        let fired = gammas.iter().any(|gamma| {
            gamma_charm_mass_differences(charm, gamma)
                .any(|dm| dm > 0.0 && dm < sel.max_delta_mass_gamma_charm)
        });
        if fired {
            decision.set(trigger);
        }
    }

    decision
}
