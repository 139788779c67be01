use style_scout::ModelBundle;
use style_scout::StyleError;
use style_scout::dimensions::DimensionTable;
use style_scout::kmeans::KMeansModel;
use style_scout::labels::ClusterLabelMap;
use style_scout::scaler::StandardScaler;
use style_scout::table::PlayerTable;

/// Bundle whose scaler centers at 50 with unit scale, so a single-attribute
/// column per dimension maps straight to a controllable scaled vector.
fn crafted_bundle(table: PlayerTable) -> ModelBundle {
    let dimensions = DimensionTable::canonical().clone();
    let scaler = StandardScaler {
        means: vec![50.0; 6],
        stds: vec![1.0; 6],
    };
    let model = KMeansModel {
        centroids: (0..6).map(|i| vec![i as f64; 6]).collect(),
        inertia: 0.0,
    };
    let labels = ClusterLabelMap::for_clusters(6).unwrap();
    ModelBundle::from_parts(dimensions, scaler, model, labels, table).expect("bundle")
}

#[test]
fn three_player_scenario_orders_by_distance() {
    // One driving attribute per dimension. A reduces+scales to the origin,
    // B to [1,0,0,0,0,0], C to [0,0,0,0,0,5].
    let table = PlayerTable::from_rows(
        &[
            "short_name",
            "movement_acceleration",
            "skill_dribbling",
            "mentality_vision",
            "attacking_finishing",
            "mentality_interceptions",
            "power_strength",
        ],
        &[
            &["A", "50", "50", "50", "50", "50", "50"],
            &["B", "51", "50", "50", "50", "50", "50"],
            &["C", "50", "50", "50", "50", "50", "55"],
        ],
    );
    let bundle = crafted_bundle(table);

    let hits = bundle.similar_players("A", 2).expect("similar");
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].name, "B");
    assert!((hits[0].distance - 1.0).abs() < 1e-9);
    assert_eq!(hits[1].name, "C");
    assert!((hits[1].distance - 5.0).abs() < 1e-9);
}

#[test]
fn top_n_clamps_to_candidate_count_minus_self() {
    let table = PlayerTable::from_rows(
        &["short_name", "movement_acceleration"],
        &[&["A", "50"], &["B", "60"], &["C", "70"]],
    );
    let bundle = crafted_bundle(table);

    let hits = bundle.similar_players("A", 25).expect("similar");
    assert_eq!(hits.len(), 2);
}

#[test]
fn lookup_falls_through_to_long_name_column() {
    // No short_name matches the query; both matches live in long_name, so
    // result names must come from the long_name column too.
    let table = PlayerTable::from_rows(
        &["short_name", "long_name", "movement_acceleration"],
        &[
            &["J. Silva", "Joao Silva Carvalho", "50"],
            &["M. Costa", "Miguel Carvalho Costa", "60"],
            &["R. Pires", "Rui Pires", "70"],
        ],
    );
    let bundle = crafted_bundle(table);

    let hits = bundle.similar_players("carvalho", 2).expect("similar");
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().any(|h| h.name == "Miguel Carvalho Costa"));
    assert!(hits.iter().all(|h| h.name != "Joao Silva Carvalho"));
}

#[test]
fn unknown_player_surfaces_not_found() {
    let table = PlayerTable::from_rows(
        &["short_name", "movement_acceleration"],
        &[&["A", "50"], &["B", "60"]],
    );
    let bundle = crafted_bundle(table);

    let err = bundle.similar_players("Nobody", 3).unwrap_err();
    assert!(matches!(err, StyleError::NotFound { .. }));
}

#[test]
fn styles_listing_matches_label_map() {
    let table = PlayerTable::from_rows(
        &["short_name", "movement_acceleration"],
        &[&["A", "50"]],
    );
    let bundle = crafted_bundle(table);

    let listed: Vec<(usize, String)> = bundle
        .styles()
        .entries()
        .map(|(i, l)| (i, l.to_string()))
        .collect();
    assert_eq!(listed.len(), 6);
    assert_eq!(listed[0].1, "Creative Playmaker");
    assert_eq!(listed[5].1, "Box-to-Box Midfielder");
}
