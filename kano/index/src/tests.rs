use super::*;
use kano_core::{BitMatrix, BitSet, Cluster, Labels, Namespace, Pod, Policy};

macro_rules! labels {
    () => { Labels::default() };
    ($($k:expr => $v:expr),+ $(,)?) => {
        Labels::from(maplit::btreemap! { $($k.to_string() => $v.to_string()),+ })
    };
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

fn rows(m: &BitMatrix) -> Vec<String> {
    m.iter().map(|r| r.to_string()).collect()
}

fn bits(s: &str) -> BitSet {
    BitSet::from_bools(s.chars().map(|c| c == '1'))
}

fn cluster(pods: Vec<Pod>, namespaces: Vec<Namespace>, policies: Vec<Policy>) -> Cluster {
    Cluster::new(pods, namespaces, policies).expect("cluster must be valid")
}

/// Two pods, one per namespace, with namespaces labeled like their pods.
fn two_namespaces() -> (Vec<Pod>, Vec<Namespace>) {
    (
        vec![
            Pod::new("default", labels! { "k0" => "v0" }),
            Pod::new("ns1", labels! { "k1" => "v1" }),
        ],
        vec![
            Namespace::new("default", labels! { "k0" => "v0" }),
            Namespace::new("ns1", labels! { "k1" => "v1" }),
        ],
    )
}

/// Two pods in each of two namespaces.
fn four_pods() -> (Vec<Pod>, Vec<Namespace>) {
    (
        vec![
            Pod::new("default", labels! { "k0" => "v0" }),
            Pod::new("default", labels! { "k1" => "v1" }),
            Pod::new("ns1", labels! { "k2" => "v2" }),
            Pod::new("ns1", labels! { "k3" => "v3" }),
        ],
        vec![
            Namespace::new("default", labels! { "k0" => "v0" }),
            Namespace::new("ns1", labels! { "k1" => "v1" }),
        ],
    )
}

/// Checks the properties every computed reachability must satisfy.
fn assert_well_formed(reach: &Reachability) {
    let n = reach.pods();
    for i in 0..n {
        assert!(reach.egress.get(i, i), "pod {i} must reach itself");
        assert!(reach.ingress.get(i, i), "pod {i} must reach itself");
    }
    assert_eq!(reach.ingress, reach.egress.transposed());
    for i in 0..n {
        if reach.pod_to_policy[i].is_clear() {
            continue;
        }
        // An isolated pod only sends to peers its policies allow, or itself.
        let mut allowed = BitSet::new(n);
        allowed.insert(i);
        for p in reach.pod_to_policy[i].iter_ones() {
            allowed.union_with(&reach.policy_allowed[p]);
        }
        assert!(
            allowed.is_superset(&reach.egress[i]) && allowed.is_superset(&reach.ingress[i]),
            "pod {i} reaches peers no policy allows"
        );
    }
}

#[test]
fn indexes_namespaces_and_keys() {
    init_tracing();

    let pods = vec![
        Pod::new("default", labels! { "app" => "web", "tier" => "front" }),
        Pod::new("default", labels! { "app" => "db" }),
        Pod::new("ns1", labels! { "tier" => "back" }),
    ];
    let namespaces = vec![
        Namespace::new("default", labels! { "env" => "prod" }),
        Namespace::new("ns1", labels! { "env" => "dev", "team" => "a" }),
        Namespace::new("empty", labels! {}),
    ];
    let index = SelectorIndex::new(&pods, &namespaces);

    assert_eq!(index.namespace_pods("default"), Some(&bits("110")));
    assert_eq!(index.namespace_pods("ns1"), Some(&bits("001")));
    assert_eq!(index.namespace_pods("empty"), None, "no pods, no entry");

    assert_eq!(index.pods_with_key("app"), Some(&bits("110")));
    assert_eq!(index.pods_with_key("tier"), Some(&bits("101")));
    assert_eq!(index.pods_with_key("env"), None);

    assert_eq!(index.namespaces_with_key("env"), Some(&bits("110")));
    assert_eq!(index.namespaces_with_key("team"), Some(&bits("010")));
    assert_eq!(index.namespaces_with_key("app"), None);

    // Every pod is in exactly one namespace bucket.
    let mut seen = BitSet::new(pods.len());
    for ns in ["default", "ns1"] {
        let bucket = index.namespace_pods(ns).unwrap();
        let mut overlap = seen.clone();
        overlap.intersect_with(bucket);
        assert!(overlap.is_clear());
        seen.union_with(bucket);
    }
    assert!(seen.is_full());
}

#[test]
fn groups_by_label_value() {
    let pods = vec![
        Pod::new("default", labels! { "User" => "A" }),
        Pod::new("default", labels! { "User" => "B" }),
        Pod::new("ns1", labels! { "User" => "A" }),
        Pod::new("ns1", labels! { "app" => "web" }),
    ];
    let groups = GroupIndex::new(&pods, "User");
    assert_eq!(groups.key(), "User");
    assert_eq!(groups.group("A"), Some(&bits("1010")));
    assert_eq!(groups.group("B"), Some(&bits("0100")));
    assert_eq!(groups.group("C"), None);
    assert_eq!(groups.group_of(&pods[2]), Some(&bits("1010")));
    assert_eq!(groups.group_of(&pods[3]), None, "pod lacks the key");
}

#[test]
fn resolves_select_and_allow_sets() {
    let (pods, namespaces) = four_pods();
    let cluster = cluster(pods, namespaces, vec![]);
    let index = SelectorIndex::new(cluster.pods(), cluster.namespaces());
    let resolver = Resolver::new(&cluster, &index);

    // Empty selectors select the namespace and allow everything.
    let r = resolver.resolve(&Policy::ingress("default")).unwrap();
    assert_eq!(r.selected, bits("1100"));
    assert_eq!(r.allowed, bits("1111"));

    // Allow labels without a namespace selector are scoped to the policy's namespace.
    let r = resolver
        .resolve(&Policy::ingress("default").allowing(labels! { "k2" => "v2" }))
        .unwrap();
    assert_eq!(r.allowed, bits("0000"));

    // A namespace selector on a key no namespace carries allows nothing.
    let r = resolver
        .resolve(&Policy::egress("default").allowing_namespaces(labels! { "nope" => "x" }))
        .unwrap();
    assert_eq!(r.allowed, bits("0000"));

    // A namespace missing one of the selector's keys doesn't match.
    let r = resolver
        .resolve(
            &Policy::egress("default")
                .allowing_namespaces(labels! { "k0" => "v0", "k1" => "v1" }),
        )
        .unwrap();
    assert_eq!(r.allowed, bits("0000"));

    // A label value mismatch excludes the pod.
    let r = resolver
        .resolve(&Policy::ingress("ns1").selecting(labels! { "k2" => "other" }))
        .unwrap();
    assert_eq!(r.selected, bits("0000"));

    let r = resolver
        .resolve(&Policy::ingress("ns1").selecting(labels! { "k3" => "v3" }).denying_all())
        .unwrap();
    assert_eq!(r.selected, bits("0001"));
    assert_eq!(r.allowed, bits("0000"));

    assert_eq!(
        resolver.resolve(&Policy::ingress("ns2")),
        None,
        "a policy in a namespace without pods is void"
    );
}

#[test]
fn one_direction_only() {
    init_tracing();

    let (pods, namespaces) = two_namespaces();
    let reach = Reachability::build(&cluster(
        pods,
        namespaces,
        vec![
            Policy::ingress("default")
                .selecting(labels! { "k0" => "v0" })
                .allowing_namespaces(labels! { "k1" => "v1" }),
            Policy::egress("ns1")
                .selecting(labels! { "k1" => "v1" })
                .allowing_namespaces(labels! { "k1" => "v1" }),
        ],
    ));
    assert_eq!(rows(&reach.ingress), ["10", "01"]);
    assert_eq!(rows(&reach.egress), ["10", "01"]);
    assert_well_formed(&reach);
}

#[test]
fn two_directions() {
    let (pods, namespaces) = two_namespaces();
    let reach = Reachability::build(&cluster(
        pods,
        namespaces,
        vec![
            Policy::ingress("default")
                .selecting(labels! { "k0" => "v0" })
                .allowing_namespaces(labels! { "k1" => "v1" }),
            Policy::egress("ns1")
                .selecting(labels! { "k1" => "v1" })
                .allowing_namespaces(labels! { "k0" => "v0" }),
        ],
    ));
    assert_eq!(rows(&reach.ingress), ["11", "01"]);
    assert_eq!(rows(&reach.egress), ["10", "11"]);
    assert_well_formed(&reach);
}

#[test]
fn default_namespace_scope() {
    let pods = vec![
        Pod::new("default", labels! { "k0" => "v0" }),
        Pod::new("default", labels! { "k1" => "v1" }),
        Pod::new("default", labels! { "k2" => "v2" }),
        Pod::new("ns1", labels! { "k3" => "v3" }),
    ];
    let namespaces = vec![
        Namespace::new("default", labels! {}),
        Namespace::new("ns1", labels! {}),
    ];
    let reach = Reachability::build(&cluster(
        pods,
        namespaces,
        vec![
            Policy::ingress("default")
                .selecting(labels! { "k0" => "v0" })
                .allowing(labels! { "k1" => "v1" }),
            // The only pod with k3 is in another namespace.
            Policy::ingress("default")
                .selecting(labels! { "k0" => "v0" })
                .allowing(labels! { "k3" => "v3" }),
            Policy::ingress("default").selecting(labels! { "k3" => "v3" }),
        ],
    ));
    assert_eq!(rows(&reach.ingress), ["1100", "0111", "0111", "0111"]);
    assert_eq!(rows(&reach.egress), ["1000", "1111", "0111", "0111"]);
    assert_eq!(rows(&reach.policy_selected), ["1000", "1000", "0000"]);
    assert_well_formed(&reach);
}

#[test]
fn namespace_selector_only() {
    let (pods, namespaces) = four_pods();
    let reach = Reachability::build(&cluster(
        pods,
        namespaces,
        vec![
            Policy::ingress("default")
                .selecting(labels! { "k0" => "v0" })
                .allowing_namespaces(labels! { "k1" => "v1" }),
            Policy::ingress("ns1")
                .selecting(labels! { "k2" => "v2" })
                .allowing_namespaces(labels! { "k0" => "v0" }),
        ],
    ));
    assert_eq!(rows(&reach.ingress), ["1001", "0101", "0110", "0101"]);
    assert_eq!(rows(&reach.egress), ["1000", "0111", "0010", "1101"]);
    assert_well_formed(&reach);
}

#[test]
fn namespace_and_pod_selectors() {
    let pods = vec![
        Pod::new("default", labels! { "k0" => "v0", "k1" => "v1" }),
        Pod::new("default", labels! { "k1" => "v1" }),
        Pod::new("ns1", labels! { "k2" => "v2" }),
        Pod::new("ns1", labels! { "k3" => "v3" }),
        Pod::new("ns1", labels! { "k4" => "v4" }),
    ];
    let namespaces = vec![
        Namespace::new("default", labels! { "k0" => "v0" }),
        Namespace::new("ns1", labels! { "k1" => "v1" }),
    ];
    let reach = Reachability::build(&cluster(
        pods,
        namespaces,
        vec![
            Policy::ingress("default")
                .selecting(labels! { "k0" => "v0", "k1" => "v1" })
                .allowing(labels! { "k4" => "v4" })
                .allowing_namespaces(labels! { "k1" => "v1" }),
            Policy::egress("default")
                .selecting(labels! { "k1" => "v1" })
                .allowing(labels! { "k2" => "v2" })
                .allowing_namespaces(labels! { "k1" => "v1" }),
            Policy::ingress("ns1")
                .selecting(labels! { "k3" => "v3" })
                .allowing(labels! { "k2" => "v2" })
                .allowing_namespaces(labels! { "k0" => "v0" }),
        ],
    ));
    assert_eq!(
        rows(&reach.ingress),
        ["10001", "01000", "11101", "00010", "00101"]
    );
    assert_eq!(
        rows(&reach.egress),
        ["10100", "01100", "00101", "00010", "10101"]
    );
    assert_well_formed(&reach);
}

#[test]
fn allow_all() {
    let (pods, namespaces) = four_pods();
    let reach = Reachability::build(&cluster(
        pods,
        namespaces,
        vec![
            Policy::ingress("default"),
            Policy::ingress("ns1")
                .selecting(labels! { "k3" => "v3" })
                .allowing(labels! { "k2" => "v2" })
                .allowing_namespaces(labels! { "k0" => "v0" }),
        ],
    ));
    assert_eq!(rows(&reach.ingress), ["1010", "0110", "0010", "0001"]);
    assert_eq!(rows(&reach.egress), ["1000", "0100", "1110", "0001"]);
    assert_eq!(rows(&reach.policy_allowed), ["1111", "0000"]);
    assert_well_formed(&reach);
}

#[test]
fn deny_all() {
    let (pods, namespaces) = four_pods();
    let reach = Reachability::build(&cluster(
        pods,
        namespaces,
        // Allow selectors on a deny-all policy are ignored.
        vec![Policy::ingress("default")
            .allowing(labels! { "k1" => "v1" })
            .allowing_namespaces(labels! { "k0" => "v0" })
            .denying_all()],
    ));
    assert_eq!(rows(&reach.ingress), ["1000", "0100", "0011", "0011"]);
    assert_eq!(rows(&reach.egress), ["1000", "0100", "0011", "0011"]);
    assert_eq!(rows(&reach.policy_allowed), ["0000"]);
    assert_eq!(rows(&reach.policy_selected), ["1100"]);
    assert_well_formed(&reach);
}

#[test]
fn deny_all_in_every_namespace() {
    let (pods, namespaces) = four_pods();
    let reach = Reachability::build(&cluster(
        pods,
        namespaces,
        vec![
            Policy::ingress("default").denying_all(),
            Policy::ingress("ns1").denying_all(),
        ],
    ));
    assert_eq!(rows(&reach.ingress), ["1000", "0100", "0010", "0001"]);
    assert_eq!(rows(&reach.egress), ["1000", "0100", "0010", "0001"]);
    assert_well_formed(&reach);
}

#[test]
fn no_policies_allow_everything() {
    let (pods, namespaces) = four_pods();
    let reach = Reachability::build(&cluster(pods, namespaces, vec![]));
    assert!(reach.egress.iter().all(BitSet::is_full));
    assert!(reach.ingress.iter().all(BitSet::is_full));
    assert_eq!(reach.policies(), 0);
}

#[test]
fn empty_cluster() {
    let reach = Reachability::build(&Cluster::default());
    assert_eq!(reach.pods(), 0);
    assert_eq!(reach.egress.rows(), 0);
}

#[test]
fn void_policies_have_no_effect() {
    let (pods, namespaces) = four_pods();
    let policies = vec![
        Policy::egress("ns1")
            .selecting(labels! { "k2" => "v2" })
            .allowing_namespaces(labels! { "k0" => "v0" }),
    ];
    let base = Reachability::build(&cluster(pods.clone(), namespaces.clone(), policies.clone()));

    let mut with_void = policies;
    with_void.insert(0, Policy::ingress("ghost").denying_all());
    let reach = Reachability::build(&cluster(pods, namespaces, with_void));

    assert_eq!(reach.egress, base.egress);
    assert_eq!(reach.ingress, base.ingress);
    assert!(reach.policy_allowed[0].is_clear());
    assert!(reach.policy_selected[0].is_clear());
}

#[test]
fn policy_matrices() {
    let pods = vec![
        Pod::new("default", labels! { "k0" => "v0", "k1" => "v1" }),
        Pod::new("default", labels! { "k1" => "v1" }),
        Pod::new("ns1", labels! { "k2" => "v2" }),
        Pod::new("ns1", labels! { "k3" => "v3" }),
    ];
    let namespaces = vec![
        Namespace::new("default", labels! { "k0" => "v0" }),
        Namespace::new("ns1", labels! { "k1" => "v1" }),
    ];
    let reach = Reachability::build(&cluster(
        pods,
        namespaces,
        vec![
            Policy::ingress("default")
                .selecting(labels! { "k0" => "v0", "k1" => "v1" })
                .allowing(labels! { "k2" => "v2" })
                .allowing_namespaces(labels! { "k1" => "v1" }),
            Policy::ingress("default")
                .selecting(labels! { "k1" => "v1" })
                .allowing_namespaces(labels! { "k1" => "v1" }),
            Policy::ingress("ns1")
                .selecting(labels! { "k3" => "v3" })
                .allowing(labels! { "k2" => "v2" })
                .allowing_namespaces(labels! { "k0" => "v0" }),
        ],
    ));
    assert_eq!(rows(&reach.pod_to_policy), ["110", "010", "000", "001"]);
    assert_eq!(rows(&reach.policy_allowed), ["0010", "0011", "0000"]);
    assert_eq!(rows(&reach.policy_selected), ["1000", "1100", "0001"]);
    assert_well_formed(&reach);
}
