use std::path::Path;

use skillmatch::config::Config;
use skillmatch::ranking::{BlendPolicy, Strategy};
use skillmatch::test_utils::{TestCase, run_table_tests};

#[test]
fn config_strategy_aliases() -> Result<(), String> {
    let cases = vec![
        TestCase {
            name: "lexical",
            input: "lexical",
            expected: Some(Strategy::Lexical),
        },
        TestCase {
            name: "numeric semantic",
            input: "2",
            expected: Some(Strategy::Semantic),
        },
        TestCase {
            name: "hyphenated popularity",
            input: "popularity-weighted",
            expected: Some(Strategy::PopularityWeighted),
        },
        TestCase {
            name: "taxonomy is not a strategy",
            input: "taxonomy",
            expected: None,
        },
    ];

    run_table_tests(cases, |raw| {
        let toml = format!("[ranking]\ndefault_strategy = \"{raw}\"\n");
        Config::from_toml_str(&toml).ok().map(|config| {
            config.strategy().expect("validated config has a strategy")
        })
    })
}

#[test]
fn config_popularity_section() {
    let config = Config::from_toml_str(
        r#"
[popularity]
lambda = 0.25
max_popularity = 1000.0
blend = "linear"
"#,
    )
    .unwrap();
    let weighting = config.weighting().unwrap();
    assert!((weighting.lambda() - 0.25).abs() < 1e-12);
    assert!((weighting.max_popularity() - 1000.0).abs() < 1e-12);
    assert_eq!(weighting.blend(), BlendPolicy::Linear);
}

#[test]
fn config_rejects_out_of_range_values() {
    assert!(Config::from_toml_str("[popularity]\nlambda = 2.0\n").is_err());
    assert!(Config::from_toml_str("[popularity]\nmax_popularity = 0.0\n").is_err());
    assert!(Config::from_toml_str("[embedding]\ndims = 0\n").is_err());
    assert!(Config::from_toml_str("[popularity]\nblend = \"average\"\n").is_err());
}

#[test]
fn config_extra_stop_words_reach_the_normalizer() {
    let config =
        Config::from_toml_str("[normalizer]\nextra_stop_words = [\"Senior\", \"team\"]\n").unwrap();
    let tokens = config.normalizer().normalize("Senior Rust engineer for our team").into_tokens();
    assert_eq!(tokens, vec!["rust", "engineer"]);
}

#[test]
fn config_relative_database_lives_under_root() {
    let config = Config::default();
    let root = Path::new("/tmp/skillmatch-root");
    assert_eq!(config.database_path(root), root.join("skillmatch.db"));
}

#[test]
fn config_round_trips_through_toml() {
    let config = Config::from_toml_str("[ranking]\ntop_k = 3\n").unwrap();
    let rendered = config.to_toml_string().unwrap();
    let reparsed = Config::from_toml_str(&rendered).unwrap();
    assert_eq!(reparsed.ranking.top_k, 3);
    assert_eq!(reparsed.strategy().unwrap(), Strategy::Lexical);
}
