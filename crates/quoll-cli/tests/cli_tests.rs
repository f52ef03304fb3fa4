//! CLI argument parsing and file round-trip tests.
//!
//! The CLI is a binary crate, so parsing is checked on a mirror of its clap
//! structs and the file handling through the crates it drives.

mod module_files {
    use std::fs;

    use quoll_ast::{Definition, DeriveMarkers, Stmt, SyntaxTree};
    use quoll_compile::{TranslateOptions, Translator};

    fn bell_module() -> SyntaxTree {
        let mut tree = SyntaxTree::new();
        let q = tree.name("q");
        let h = tree.call_named("H", vec![q]);
        let h = tree.expr_stmt(h);
        let def = tree.add_stmt(Stmt::Def(Definition {
            name: "prepare".into(),
            params: vec!["q".into()],
            body: vec![h],
            operation: Some(DeriveMarkers {
                adjoint: true,
                controlled: true,
            }),
        }));
        tree.push_body(def);
        tree
    }

    #[test]
    fn test_translate_through_json_files() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("bell.json");
        fs::write(&input, bell_module().to_json(true).unwrap()).unwrap();

        let source = fs::read_to_string(&input).unwrap();
        let tree = SyntaxTree::from_json(&source).unwrap();
        let translation = Translator::new(TranslateOptions::default())
            .translate(tree)
            .unwrap();

        let output = dir.path().join("bell_translated.json");
        fs::write(&output, translation.tree.to_json(false).unwrap()).unwrap();
        let reloaded = SyntaxTree::from_json(&fs::read_to_string(&output).unwrap()).unwrap();

        let rendered = reloaded.render_module().unwrap();
        assert!(rendered.starts_with("import quoll.boilerplate as bp"));
        assert!(rendered.contains("def _prepare_adj(q):"));
        assert!(rendered.contains("def _prepare_ctl(__control, q):"));
        assert!(rendered.contains("def _prepare_ctl_adj(__control, q):"));
    }

    #[test]
    fn test_malformed_module_rejected() {
        assert!(SyntaxTree::from_json(r#"{"circuit": "test"}"#).is_err());
    }

    #[test]
    fn test_yaml_options_apply() {
        let options: TranslateOptions =
            serde_yaml_ng::from_str("boilerplate_alias: qb\nboilerplate_module: quoll.rt\n")
                .unwrap();
        let translation = Translator::new(options).translate(bell_module()).unwrap();
        let rendered = translation.tree.render_module().unwrap();
        assert!(rendered.starts_with("import quoll.rt as qb"));
    }
}

mod clap_parsing {
    use clap::{Parser, Subcommand};

    // Mirror of the CLI structs in main.rs.
    #[derive(Parser)]
    #[command(name = "quoll")]
    struct TestCli {
        #[arg(short, long, action = clap::ArgAction::Count, global = true)]
        verbose: u8,

        #[command(subcommand)]
        command: TestCommands,
    }

    #[derive(Subcommand)]
    enum TestCommands {
        Translate {
            #[arg(short, long)]
            input: String,
            #[arg(short, long)]
            output: Option<String>,
            #[arg(short, long)]
            config: Option<String>,
            #[arg(long)]
            pretty: bool,
            #[arg(long)]
            show: bool,
        },
        Render {
            #[arg(short, long)]
            input: String,
        },
        Version,
    }

    #[test]
    fn test_translate_minimal() {
        let cli = TestCli::try_parse_from(["quoll", "translate", "-i", "bell.json"]).unwrap();
        match cli.command {
            TestCommands::Translate {
                input,
                output,
                config,
                pretty,
                show,
            } => {
                assert_eq!(input, "bell.json");
                assert!(output.is_none());
                assert!(config.is_none());
                assert!(!pretty);
                assert!(!show);
            }
            _ => panic!("expected Translate"),
        }
    }

    #[test]
    fn test_translate_all_options() {
        let cli = TestCli::try_parse_from([
            "quoll",
            "translate",
            "--input",
            "bell.json",
            "--output",
            "out.json",
            "--config",
            "quoll.yaml",
            "--pretty",
            "--show",
        ])
        .unwrap();
        match cli.command {
            TestCommands::Translate {
                output,
                config,
                pretty,
                show,
                ..
            } => {
                assert_eq!(output.as_deref(), Some("out.json"));
                assert_eq!(config.as_deref(), Some("quoll.yaml"));
                assert!(pretty);
                assert!(show);
            }
            _ => panic!("expected Translate"),
        }
    }

    #[test]
    fn test_translate_requires_input() {
        assert!(TestCli::try_parse_from(["quoll", "translate"]).is_err());
    }

    #[test]
    fn test_render() {
        let cli = TestCli::try_parse_from(["quoll", "render", "-i", "out.json"]).unwrap();
        assert!(matches!(cli.command, TestCommands::Render { input } if input == "out.json"));
    }

    #[test]
    fn test_verbosity() {
        let cli = TestCli::try_parse_from(["quoll", "-vv", "version"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, TestCommands::Version));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(TestCli::try_parse_from(["quoll"]).is_err());
    }
}
