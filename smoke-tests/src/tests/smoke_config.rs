#[cfg(test)]
mod smoke_config {
    use std::fs;
    use zkinfer::{Config, ConflictPolicy, Graph, OptimizationLevel, Workspace, ZkError};

    #[test]
    fn fail_policy_from_a_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("artifacts");
        let path = dir.path().join("zkinfer.toml");
        fs::write(
            &path,
            format!(
                "workspace = {:?}\nconflict_policy = \"fail\"\noptimization_level = \"O1\"\n",
                root.display().to_string()
            ),
        )
        .unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.conflict_policy, ConflictPolicy::Fail);

        let ws = Workspace::open(config).unwrap();
        assert_eq!(ws.store().root(), root.as_path());

        let mut g = Graph::new();
        let x = g.private_input("x");
        let sq = g.mul(x, x);
        g.output(sq, "y");
        let level = ws.config().optimization_level;
        assert_eq!(level, OptimizationLevel::O1);
        let id = ws.compile(&g, level).unwrap();
        match ws.compile(&g, level) {
            Err(ZkError::DuplicateArtifact(name)) => assert_eq!(name, id.to_string()),
            other => panic!("unexpected {:?}", other),
        }
    }
}
