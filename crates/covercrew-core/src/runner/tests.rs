    use super::*;
    use crate::pyenv::MockPythonEnv;
    use crate::runtime::testing::FakeHandle;
    use crate::runtime::{MockRuntime, ServeHandle};
    use std::future::pending;
    use tempfile::TempDir;

    fn config() -> RunnerConfig {
        RunnerConfig {
            probe: ProbePolicy::new()
                .with_max_attempts(2)
                .with_initial_delay(Duration::from_millis(1))
                .with_jitter(false),
            stop_grace: Duration::from_millis(100),
            ..RunnerConfig::default()
        }
    }

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("main.py"), "print('hello')\n").unwrap();
        dir
    }

    fn all_models() -> Vec<String> {
        vec![
            "qwen3:latest".to_string(),
            "mxbai-embed-large:latest".to_string(),
        ]
    }

    /// Installed runtime; spawns `handle` unless `handle` is `None`
    fn runtime(handle: Option<&FakeHandle>, installed: Vec<String>) -> MockRuntime {
        let mut runtime = MockRuntime::new();
        runtime.expect_binary().return_const("ollama".to_string());
        runtime
            .expect_base_url()
            .return_const("http://localhost:11434".to_string());
        runtime.expect_is_installed().return_const(true);

        match handle {
            Some(handle) => {
                let spawned = handle.clone();
                runtime.expect_is_running().return_const(false);
                runtime
                    .expect_spawn()
                    .times(1)
                    .returning(move || Ok(Box::new(spawned.clone()) as Box<dyn ServeHandle>));
            }
            None => {
                runtime.expect_is_running().return_const(true);
                runtime.expect_spawn().never();
            }
        }

        runtime
            .expect_probe()
            .returning(|| Ok("0.6.2".to_string()));
        runtime
            .expect_list_models()
            .returning(move || Ok(installed.clone()));
        runtime
    }

    fn python_exiting(code: i32) -> MockPythonEnv {
        let mut python = MockPythonEnv::new();
        python.expect_exists().return_const(true);
        python
            .expect_run()
            .returning(move |_, _, _| Ok(AppExit::new(code)));
        python
    }

    fn runner(runtime: MockRuntime, python: MockPythonEnv, dir: &TempDir) -> Runner {
        Runner::new(
            Arc::new(runtime),
            Arc::new(python),
            ProjectLayout::new(dir.path()),
            config(),
        )
    }

    #[tokio::test]
    async fn test_stops_runtime_it_started() {
        let dir = project();
        let handle = FakeHandle::default();

        let exit = runner(runtime(Some(&handle), all_models()), python_exiting(0), &dir)
            .run_until(pending())
            .await
            .unwrap();

        assert_eq!(exit.code(), 0);
        assert!(handle.was_terminated());
    }

    #[tokio::test]
    async fn test_leaves_pre_existing_runtime_running() {
        let dir = project();

        // `spawn` is never expected, so no handle exists to terminate
        let exit = runner(runtime(None, all_models()), python_exiting(0), &dir)
            .run_until(pending())
            .await
            .unwrap();

        assert!(exit.success());
    }

    #[tokio::test]
    async fn test_present_models_are_never_pulled() {
        let dir = project();

        let mut runtime = runtime(None, all_models());
        runtime.expect_pull_model().never();

        let exit = runner(runtime, python_exiting(0), &dir)
            .run_until(pending())
            .await
            .unwrap();
        assert!(exit.success());
    }

    #[tokio::test]
    async fn test_implicit_latest_tag_counts_as_present() {
        let dir = project();

        let mut runtime = runtime(None, vec!["Qwen3:latest".to_string()]);
        runtime.expect_pull_model().never();

        let mut runner = runner(runtime, python_exiting(0), &dir);
        runner.config.models = vec![ModelRef::parse("qwen3")];

        assert!(runner.run_until(pending()).await.unwrap().success());
    }

    #[tokio::test]
    async fn test_missing_model_is_pulled() {
        let dir = project();

        let mut runtime = runtime(None, vec!["qwen3:latest".to_string()]);
        runtime
            .expect_pull_model()
            .withf(|model| model == "mxbai-embed-large:latest")
            .times(1)
            .returning(|_| Ok(()));

        let exit = runner(runtime, python_exiting(0), &dir)
            .run_until(pending())
            .await
            .unwrap();
        assert!(exit.success());
    }

    #[tokio::test]
    async fn test_propagates_application_exit_code() {
        let dir = project();
        let handle = FakeHandle::default();

        let exit = runner(runtime(Some(&handle), all_models()), python_exiting(3), &dir)
            .run_until(pending())
            .await
            .unwrap();

        assert_eq!(exit.code(), 3);
        assert!(handle.was_terminated());
    }

    #[tokio::test]
    async fn test_missing_runtime_fails_before_later_steps() {
        let dir = project();

        let mut runtime = MockRuntime::new();
        runtime.expect_binary().return_const("ollama".to_string());
        runtime.expect_is_installed().return_const(false);
        runtime.expect_is_running().never();
        runtime.expect_spawn().never();

        let mut python = MockPythonEnv::new();
        python.expect_run().never();

        let err = runner(runtime, python, &dir)
            .run_until(pending())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::MissingPrerequisite {
                prerequisite: Prerequisite::RuntimeBinary,
                ..
            }
        ));
        assert_eq!(err.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_missing_entry_point_is_fatal() {
        let dir = TempDir::new().unwrap();

        let mut runtime = MockRuntime::new();
        runtime.expect_is_installed().return_const(true);
        runtime.expect_is_running().never();

        let err = runner(runtime, MockPythonEnv::new(), &dir)
            .run_until(pending())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::MissingPrerequisite {
                prerequisite: Prerequisite::EntryPoint,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_missing_environment_is_fatal() {
        let dir = project();

        let mut runtime = MockRuntime::new();
        runtime.expect_is_installed().return_const(true);
        runtime.expect_is_running().never();

        let mut python = MockPythonEnv::new();
        python
            .expect_exists()
            .withf(|venv| venv.ends_with("venv"))
            .return_const(false);

        let err = runner(runtime, python, &dir)
            .run_until(pending())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::MissingPrerequisite {
                prerequisite: Prerequisite::VirtualEnv,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_pull_failure_stops_owned_runtime() {
        let dir = project();
        let handle = FakeHandle::default();

        let mut runtime = runtime(Some(&handle), Vec::new());
        runtime.expect_pull_model().times(1).returning(|model| {
            Err(Error::command_failed(
                format!("pull {}", model),
                "exit status: 1",
            ))
        });

        let mut python = MockPythonEnv::new();
        python.expect_exists().return_const(true);
        python.expect_run().never();

        let err = runner(runtime, python, &dir)
            .run_until(pending())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::CommandFailed { .. }));
        assert!(handle.was_terminated());
    }

    #[tokio::test]
    async fn test_interrupt_before_start_spawns_nothing() {
        let dir = project();

        let mut runtime = MockRuntime::new();
        runtime.expect_is_installed().return_const(true);
        runtime.expect_is_running().never();
        runtime.expect_spawn().never();

        let mut python = MockPythonEnv::new();
        python.expect_exists().return_const(true);
        python.expect_run().never();

        let exit = runner(runtime, python, &dir)
            .run_until(std::future::ready(()))
            .await
            .unwrap();

        assert_eq!(exit, AppExit::interrupted());
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_while_waiting_for_readiness_stops_owned_runtime() {
        let dir = project();
        let handle = FakeHandle::default();
        let spawned = handle.clone();

        let mut runtime = MockRuntime::new();
        runtime.expect_binary().return_const("ollama".to_string());
        runtime
            .expect_base_url()
            .return_const("http://localhost:11434".to_string());
        runtime.expect_is_installed().return_const(true);
        runtime.expect_is_running().return_const(false);
        runtime
            .expect_spawn()
            .times(1)
            .returning(move || Ok(Box::new(spawned.clone()) as Box<dyn ServeHandle>));
        // Server never comes up; the runner sits in the readiness backoff
        runtime.expect_probe().returning(|| {
            Err(Error::Runtime(covercrew_ollama::Error::Network(
                "connection refused".to_string(),
            )))
        });
        runtime.expect_list_models().never();
        runtime.expect_pull_model().never();

        let mut python = MockPythonEnv::new();
        python.expect_exists().return_const(true);
        python.expect_run().never();

        let mut runner = runner(runtime, python, &dir);
        runner.config.probe = ProbePolicy::new()
            .with_max_attempts(10)
            .with_initial_delay(Duration::from_secs(1))
            .with_jitter(false);

        let exit = runner
            .run_until(tokio::time::sleep(Duration::from_millis(50)))
            .await
            .unwrap();

        assert_eq!(exit, AppExit::interrupted());
        assert!(handle.was_terminated());
    }

    #[tokio::test]
    async fn test_readiness_failure_stops_owned_runtime() {
        let dir = project();
        let handle = FakeHandle::default();
        let spawned = handle.clone();

        let mut runtime = MockRuntime::new();
        runtime.expect_binary().return_const("ollama".to_string());
        runtime
            .expect_base_url()
            .return_const("http://localhost:11434".to_string());
        runtime.expect_is_installed().return_const(true);
        runtime.expect_is_running().return_const(false);
        runtime
            .expect_spawn()
            .times(1)
            .returning(move || Ok(Box::new(spawned.clone()) as Box<dyn ServeHandle>));
        runtime.expect_probe().times(2).returning(|| {
            Err(Error::Runtime(covercrew_ollama::Error::Network(
                "connection refused".to_string(),
            )))
        });

        let mut python = MockPythonEnv::new();
        python.expect_exists().return_const(true);
        python.expect_run().never();

        let err = runner(runtime, python, &dir)
            .run_until(pending())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::RuntimeNotReady { .. }));
        assert!(handle.was_terminated());
    }

    #[tokio::test]
    async fn test_forwards_arguments_to_entry_point() {
        let dir = project();

        let mut python = MockPythonEnv::new();
        python.expect_exists().return_const(true);
        python
            .expect_run()
            .withf(|venv, entry, args| {
                venv.ends_with("venv")
                    && entry.ends_with("main.py")
                    && args.len() == 2
                    && args[0] == "--company"
                    && args[1] == "Acme"
            })
            .times(1)
            .returning(|_, _, _| Ok(AppExit::new(0)));

        let mut runner = runner(runtime(None, all_models()), python, &dir);
        runner.config.args = vec!["--company".to_string(), "Acme".to_string()];

        assert!(runner.run_until(pending()).await.unwrap().success());
    }
