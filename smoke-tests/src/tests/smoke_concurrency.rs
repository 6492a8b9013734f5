#[cfg(test)]
mod smoke_concurrency {
    use std::sync::Arc;
    use std::thread;
    use zkinfer::{Graph, Inputs, OptimizationLevel, ProveRequest, SchemeKind, Workspace};

    fn square_graph() -> Graph {
        let mut g = Graph::new();
        let x = g.private_input("x");
        let y = g.public_input("y");
        let sq = g.mul(x, x);
        g.assert_equal(sq, y);
        g
    }

    /// Provers sharing a workspace race on the same proof name; whatever
    /// is left in the store afterwards is a complete, valid proof.
    #[test]
    fn concurrent_provers_leave_a_consistent_store() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Arc::new(Workspace::open_at(dir.path()).unwrap());
        let circuit = ws.compile(&square_graph(), OptimizationLevel::O2).unwrap();
        let (pk, vk) = ws.setup(&circuit, SchemeKind::Groth16).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ws = ws.clone();
                thread::spawn(move || {
                    let inputs: Inputs = vec![("x", 9i64), ("y", 81)].into_iter().collect();
                    ws.prove(&circuit, &pk, &inputs).unwrap()
                })
            })
            .collect();
        let ids: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(ids.windows(2).all(|w| w[0] == w[1]));

        let (proof, public) = ids[0];
        assert!(ws.verify(&vk, &proof, &public).unwrap());
        let leftovers = std::fs::read_dir(dir.path())
            .unwrap()
            .filter(|e| {
                e.as_ref()
                    .map(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
                    .unwrap_or(false)
            })
            .count();
        assert_eq!(leftovers, 0);
    }

    /// Provers with different witnesses race on one circuit. Every pair a
    /// prover gets back verifies, and so does the pair left in the store.
    #[test]
    fn concurrent_provers_with_distinct_inputs_keep_pairs_together() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Arc::new(Workspace::open_at(dir.path()).unwrap());
        let circuit = ws.compile(&square_graph(), OptimizationLevel::O2).unwrap();
        let (pk, vk) = ws.setup(&circuit, SchemeKind::Groth16).unwrap();

        let handles: Vec<_> = (2..=9i64)
            .map(|x| {
                let ws = ws.clone();
                thread::spawn(move || {
                    let inputs: Inputs = vec![("x", x), ("y", x * x)].into_iter().collect();
                    let (proof, public) = ws.prove(&circuit, &pk, &inputs).unwrap();
                    assert!(ws.verify(&vk, &proof, &public).unwrap(), "x = {}", x);
                    (proof, public)
                })
            })
            .collect();
        let ids: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(ids.windows(2).all(|w| w[0] == w[1]));

        let (proof, public) = ids[0];
        assert!(ws.verify(&vk, &proof, &public).unwrap());
    }

    #[test]
    fn batch_of_squares() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::open_at(dir.path()).unwrap();
        let circuit = ws.compile(&square_graph(), OptimizationLevel::O3).unwrap();
        let (pk, vk) = ws.setup(&circuit, SchemeKind::Groth16).unwrap();

        let requests: Vec<ProveRequest> = (1..=6i64)
            .map(|x| ProveRequest {
                circuit,
                proving_key: pk,
                // every third claim is off by one
                inputs: vec![("x", x), ("y", x * x + (x % 3 == 0) as i64)]
                    .into_iter()
                    .collect(),
            })
            .collect();
        let results = ws.prove_many(&requests);
        for (x, result) in (1..=6i64).zip(results.iter()) {
            assert_eq!(result.is_ok(), x % 3 != 0, "x = {}", x);
        }
        // successful requests of one circuit share their artifact names
        let ids: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        assert!(ids.windows(2).all(|w| w[0] == w[1]));

        let last: Inputs = vec![("x", 7i64), ("y", 49)].into_iter().collect();
        let (proof, public) = ws.prove(&circuit, &pk, &last).unwrap();
        assert_eq!(&(proof, public), ids[0]);
        assert!(ws.verify(&vk, &proof, &public).unwrap());
    }
}
