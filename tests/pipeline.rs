//! End-to-end tests: corpus -> training set -> train -> save/load -> classify.

use rand::rngs::StdRng;
use rand::SeedableRng;

use chatintent::config::DEFAULT_CONFIDENCE_THRESHOLD;
use chatintent::corpus::{parse_chat_corpus, LabelMode};
use chatintent::{
    classify, encode_one, train, train_from_corpus, ClassifierError, Corpus, ResponseTable,
    TrainConfig, TrainingSet, WeightSnapshot,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn hola_adios() -> Corpus {
    [("greeting", "hola"), ("goodbye", "adios")]
        .into_iter()
        .collect()
}

fn small_config(max_epochs: usize) -> TrainConfig {
    TrainConfig {
        hidden_size: 4,
        learning_rate: 0.1,
        max_epochs,
        dropout: false,
    }
}

// ---------------------------------------------------------------------------
// Two-intent scenario
// ---------------------------------------------------------------------------

#[test]
fn test_training_set_for_two_intents() {
    let set = TrainingSet::from_corpus(&hola_adios()).unwrap();
    assert_eq!(set.categories, vec!["goodbye", "greeting"]);
    assert_eq!(set.vocabulary.len(), 2);
    assert!(set.vocabulary.contains("hola"));
    assert!(set.vocabulary.contains("adios"));
    // each row has exactly the word of its own pattern
    for (r, pattern) in ["adios", "hola"].iter().enumerate() {
        let col = set.vocabulary.position(pattern).unwrap();
        assert_eq!(set.features[[r, col]], 1.0);
        assert_eq!(set.features.row(r).sum(), 1.0);
        assert_eq!(set.labels[[r, r]], 1.0);
    }
}

#[test]
fn test_zero_epochs_trains_exactly_once() {
    let set = TrainingSet::from_corpus(&hola_adios()).unwrap();
    let (snapshot, report) =
        train(&set, &small_config(0), &mut StdRng::seed_from_u64(1)).unwrap();
    assert_eq!(report.epochs_run, 1);
    assert_eq!(snapshot.network().w0().dim(), (2, 4));
    assert_eq!(snapshot.network().w1().dim(), (4, 2));
}

#[test]
fn test_converged_network_recognizes_training_sentences() {
    let (snapshot, report) = train_from_corpus(
        &hola_adios(),
        &small_config(30_000),
        &mut StdRng::seed_from_u64(2024),
    )
    .unwrap();
    assert!(report.epochs_run > 10_000);

    let hola = classify("hola", &snapshot, DEFAULT_CONFIDENCE_THRESHOLD).unwrap();
    assert_eq!(hola[0].category, "greeting");
    assert!(hola[0].confidence > 0.5, "confidence {}", hola[0].confidence);

    let adios = classify("adios", &snapshot, DEFAULT_CONFIDENCE_THRESHOLD).unwrap();
    assert_eq!(adios[0].category, "goodbye");
}

#[test]
fn test_empty_sentence_has_zero_features() {
    let (snapshot, _) = train_from_corpus(
        &hola_adios(),
        &small_config(1_000),
        &mut StdRng::seed_from_u64(8),
    )
    .unwrap();
    assert!(encode_one("", snapshot.vocabulary()).iter().all(|&x| x == 0.0));
    let predictions = classify("", &snapshot, DEFAULT_CONFIDENCE_THRESHOLD).unwrap();
    assert!(predictions.len() <= snapshot.categories().len());
    // unknown words encode exactly like the empty sentence
    assert_eq!(
        classify("xyz qwerty", &snapshot, DEFAULT_CONFIDENCE_THRESHOLD).unwrap(),
        predictions
    );
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

#[test]
fn test_snapshot_file_round_trip_preserves_predictions() {
    let (snapshot, _) = train_from_corpus(
        &hola_adios(),
        &small_config(2_000),
        &mut StdRng::seed_from_u64(99),
    )
    .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    snapshot.save(&path).unwrap();
    let loaded = WeightSnapshot::load(&path).unwrap();

    assert_eq!(loaded, snapshot);
    assert_eq!(loaded.fingerprint(), snapshot.fingerprint());
    for sentence in ["hola", "adios", "hola adios", "otra cosa"] {
        assert_eq!(
            classify(sentence, &loaded, 0.0).unwrap(),
            classify(sentence, &snapshot, 0.0).unwrap(),
            "predictions differ for {sentence:?}"
        );
    }
}

#[test]
fn test_corrupt_snapshot_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    std::fs::write(&path, r#"{"Synapse_0": {"Rows": 2}}"#).unwrap();
    let err = WeightSnapshot::load(&path).unwrap_err();
    assert!(matches!(err, ClassifierError::SnapshotLoad(_)));
    assert_eq!(err.exit_code(), 5);
}

// ---------------------------------------------------------------------------
// Chat corpus through to replies
// ---------------------------------------------------------------------------

#[test]
fn test_chat_corpus_to_reply() {
    let text = "#hola (greeting)\n#buenos dias (greeting)\n#adios (goodbye)\n#hasta luego (goodbye)\n#gracias (thanks)\n#(noanswer)";
    let corpus = parse_chat_corpus(text, LabelMode::Compound).unwrap();
    let (snapshot, _) = train_from_corpus(
        &corpus,
        &TrainConfig {
            hidden_size: 8,
            ..small_config(5_000)
        },
        &mut StdRng::seed_from_u64(5),
    )
    .unwrap();
    assert_eq!(
        snapshot.categories(),
        &["goodbye", "greeting", "noanswer", "thanks"]
    );

    let table = ResponseTable::from_json(
        r#"{"Category": {"Greeting": ["¡Hola! ¿Qué deseas?"], "Goodbye": ["Hasta pronto"],
            "Thanks": ["Con gusto"], "Noanswer": ["No entendí"]}}"#,
    )
    .unwrap();

    let predictions = classify("gracias", &snapshot, DEFAULT_CONFIDENCE_THRESHOLD).unwrap();
    assert_eq!(predictions[0].category, "thanks");
    let reply = table
        .respond(&predictions, &mut StdRng::seed_from_u64(0))
        .unwrap();
    assert_eq!(reply.text, "Con gusto");

    let reply = table.respond(&[], &mut StdRng::seed_from_u64(0)).unwrap();
    assert_eq!(reply.text, "No entendí");
}

#[test]
fn test_empty_corpus_exit_code() {
    let err = train_from_corpus(
        &Corpus::new(),
        &small_config(0),
        &mut StdRng::seed_from_u64(0),
    )
    .unwrap_err();
    assert_eq!(err.exit_code(), 3);
}
