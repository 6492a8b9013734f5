#[cfg(test)]
mod smoke_linear_model {
    use std::fs;
    use zkinfer::{
        load_model, ExportFormat, Inputs, LinearModel, ModelFormat, OptimizationLevel,
        SchemeKind, Workspace,
    };

    const HOUSE_PRICE: &str = r##"
# price = 1.5 * rooms + 0.25 * area - 3 * age + 20
inputs = 3
w1 = 1.5
w2 = 0.25
w3 = -3
b = 20
"##;

    #[test]
    fn linear_model_file_to_verified_proof() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("house.txt");
        fs::write(&path, HOUSE_PRICE).unwrap();
        let ws = Workspace::open_at(dir.path().join("ws")).unwrap();
        let scale = ws.config().fixed_point_scale;

        let graph = load_model(&path, None, scale).unwrap();
        let circuit = ws.compile(&graph, OptimizationLevel::O3).unwrap();
        let (pk, vk) = ws.setup(&circuit, SchemeKind::Groth16).unwrap();

        let model = LinearModel::parse(HOUSE_PRICE).unwrap();
        let x = [4i64, 120, 10];
        let y = model.evaluate(&x, scale).unwrap();
        // 1500 * 4 + 250 * 120 - 3000 * 10 + 20000
        assert_eq!(y, 26000);
        let inputs: Inputs = vec![("x1", x[0]), ("x2", x[1]), ("x3", x[2]), ("y", y)]
            .into_iter()
            .collect();
        let (proof, public) = ws.prove(&circuit, &pk, &inputs).unwrap();
        assert!(ws.verify(&vk, &proof, &public).unwrap());

        let info = ws.circuit_info(&circuit).unwrap();
        assert_eq!(info.public, vec!["y".to_string()]);
        assert_eq!(info.num_public, 1);

        let json = ws.export_verifier(&vk, ExportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(value["num_public"], 1);
    }

    #[test]
    fn the_scale_is_part_of_the_circuit() {
        let model = LinearModel::parse(HOUSE_PRICE).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::open_at(dir.path()).unwrap();
        let coarse = ws
            .compile(&model.to_graph(10).unwrap(), OptimizationLevel::O2)
            .unwrap();
        let fine = ws
            .compile(&model.to_graph(1000).unwrap(), OptimizationLevel::O2)
            .unwrap();
        assert_ne!(coarse.fingerprint(), fine.fingerprint());
        assert_eq!("linear".parse::<ModelFormat>().unwrap(), ModelFormat::Linear);
    }
}
