use swarm::DisjointSetCollection;

type Groups = DisjointSetCollection<String, i64>;

/// Random unions over `n` elements in one dimension, checked against a
/// relabelling reference after every step.
fn run_random_unions(seed: u64, n: usize, unions: usize) {
    let mut rng = fastrand::Rng::with_seed(seed);
    let dim: i64 = 0;
    let names: Vec<String> = (0..n).map(|i| format!("r{i}")).collect();

    let mut groups = Groups::new();
    for name in &names {
        groups.make_singleton(&dim, name.as_str());
    }
    let mut labels: Vec<usize> = (0..n).collect();
    let mut classes = n;

    for _ in 0..unions {
        let (a, b) = (rng.usize(0..n), rng.usize(0..n));
        let roots_before = groups.get_roots(&dim).len();
        let merged = groups
            .make_union(&dim, names[a].as_str(), names[b].as_str())
            .unwrap();

        let (keep, gone) = (labels[a], labels[b]);
        assert_eq!(merged, keep != gone, "seed {seed}: {a} ~ {b}");
        if merged {
            for label in labels.iter_mut().filter(|label| **label == gone) {
                *label = keep;
            }
            classes -= 1;
            assert_eq!(groups.get_roots(&dim).len(), roots_before - 1);
        } else {
            assert_eq!(groups.get_roots(&dim).len(), roots_before);
        }
        assert!(groups.connected(&dim, names[a].as_str(), names[b].as_str()).unwrap());
    }

    assert_eq!(groups.class_count(&dim), classes);
    for (i, name) in names.iter().enumerate() {
        let members = groups.find_members(&dim, name.as_str()).unwrap();
        assert!(members.contains(&name), "{name} missing from its own class");
        let expected = labels.iter().filter(|label| **label == labels[i]).count();
        assert_eq!(members.len(), expected);
    }
}

#[test]
fn test_random_unions_match_reference() {
    for seed in [1, 7, 42, 1234] {
        run_random_unions(seed, 200, 150);
    }
}

#[test]
fn test_union_is_idempotent() {
    let mut rng = fastrand::Rng::with_seed(99);
    let dim: i64 = 3;
    let mut groups = Groups::new();
    let names: Vec<String> = (0..50).map(|i| format!("n{i}")).collect();
    for name in &names {
        groups.make_singleton(&dim, name.as_str());
    }

    for _ in 0..100 {
        let (a, b) = (rng.usize(0..50), rng.usize(0..50));
        groups
            .make_union(&dim, names[a].as_str(), names[b].as_str())
            .unwrap();
        let roots = groups.get_roots(&dim).len();
        assert!(!groups
            .make_union(&dim, names[a].as_str(), names[b].as_str())
            .unwrap());
        assert!(!groups
            .make_union(&dim, names[b].as_str(), names[a].as_str())
            .unwrap());
        assert_eq!(groups.get_roots(&dim).len(), roots);
    }
}

#[test]
fn test_dimensions_stay_isolated() {
    let mut rng = fastrand::Rng::with_seed(5);
    let names: Vec<String> = (0..64).map(|i| format!("e{i}")).collect();
    let (busy, quiet): (i64, i64) = (1, 2);

    let mut groups = Groups::new();
    for name in &names {
        groups.make_singleton(&busy, name.as_str());
        groups.make_singleton(&quiet, name.as_str());
    }
    let quiet_before = groups.partition_digest_hex(&quiet, "sha256").unwrap();

    for _ in 0..200 {
        let (a, b) = (rng.usize(0..64), rng.usize(0..64));
        groups
            .make_union(&busy, names[a].as_str(), names[b].as_str())
            .unwrap();
    }

    assert_eq!(groups.get_roots(&quiet).len(), 64);
    assert_eq!(
        groups.partition_digest_hex(&quiet, "sha256").unwrap(),
        quiet_before
    );
    for name in &names {
        assert_eq!(
            groups.find_members(&quiet, name.as_str()).unwrap(),
            vec![name]
        );
    }
}

#[test]
fn test_make_set_order_does_not_change_partition() {
    let mut rng = fastrand::Rng::with_seed(11);
    let dim: i64 = 9;
    let mut names: Vec<String> = (0..30).map(|i| format!("m{i}")).collect();

    let mut ordered = Groups::new();
    ordered
        .make_set(&dim, names.iter().map(String::as_str))
        .unwrap();

    rng.shuffle(&mut names);
    let mut shuffled = Groups::new();
    shuffled
        .make_set(&dim, names.iter().map(String::as_str))
        .unwrap();

    assert_eq!(ordered.class_count(&dim), 1);
    assert_eq!(
        ordered.partition_digest(&dim, "blake3").unwrap(),
        shuffled.partition_digest(&dim, "blake3").unwrap()
    );
}
