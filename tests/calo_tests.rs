use hftrigger::calo::{CaloCluster, CaloClusterCuts};
use hftrigger::monitoring::{names, CountingSink};
use rstest::rstest;

fn cluster(energy: f32, time: f32, m02: f32) -> CaloCluster {
    CaloCluster {
        global_index: 7,
        energy,
        eta: 0.1,
        phi: 1.0,
        time,
        m02,
    }
}

#[rstest]
#[case::accepted(0.0, 0.3, true, 3.0)]
#[case::late(250.0, 0.3, false, 1.0)]
#[case::early(-250.0, 0.3, false, 1.0)]
#[case::elongated(0.0, 1.5, false, 2.0)]
fn test_cluster_stages(#[case] time: f32, #[case] m02: f32, #[case] expected: bool, #[case] stage: f32) {
    let cuts = CaloClusterCuts::default();
    let sink = CountingSink::new();
    assert_eq!(cuts.is_selected(&cluster(2.0, time, m02), &sink), expected);

    let filter = sink.get(names::CALO_CLUSTER_FILTER);
    assert_eq!(filter.count_at(0.0), 1);
    assert_eq!(filter.count_at(stage), 1);
    assert_eq!(sink.get(names::CALO_CLUSTER_E_OUT).len(), expected as usize);
}

#[test]
fn test_select_keeps_passing_clusters() {
    let cuts = CaloClusterCuts::default();
    let sink = CountingSink::new();
    let clusters = vec![cluster(1.0, 0.0, 0.2), cluster(5.0, 500.0, 0.2), cluster(3.0, 10.0, 0.9)];

    let photons = cuts.select(&clusters, &sink);
    assert_eq!(photons.len(), 2);
    assert_eq!(photons[1].energy, 3.0);
    assert_eq!(photons[0].cluster_index, 7);
    assert_eq!(sink.get(names::CALO_CLUSTER_E_IN).len(), 3);
}
