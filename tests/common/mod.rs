// Shared helpers for integration tests.
//
// Provides a sandboxed home directory and a recording executor that behaves
// like Homebrew and mamba closely enough for the install flow: environments
// created with `mamba create` show up in `mamba env list`, installed packages
// drop their executables into the environment, and anything linked into
// `~/.local/bin` counts as on the search path.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use appstrap::catalog::InstallContext;
use appstrap::environment::EnvironmentContext;
use appstrap::exec::{ExecResult, Executor};
use appstrap::logging::Logger;

/// Executor that records command lines and simulates the package managers.
#[derive(Debug)]
pub struct RecordingExecutor {
    user_local_bin: PathBuf,
    prefix: PathBuf,
    calls: Mutex<Vec<String>>,
    on_path: Mutex<HashSet<String>>,
    envs: Mutex<BTreeSet<String>>,
    provides: HashMap<String, Vec<String>>,
    failures: Vec<String>,
}

impl RecordingExecutor {
    /// Create an executor for `sandbox`; nothing is on the path yet.
    pub fn new(sandbox: &Sandbox) -> Self {
        Self {
            user_local_bin: sandbox.env.user_local_bin.clone(),
            prefix: sandbox.miniforge_prefix(),
            calls: Mutex::new(Vec::new()),
            on_path: Mutex::new(HashSet::new()),
            envs: Mutex::new(BTreeSet::new()),
            provides: HashMap::new(),
            failures: Vec::new(),
        }
    }

    /// Make `programs` resolvable.
    pub fn with_on_path(self, programs: &[&str]) -> Self {
        self.on_path
            .lock()
            .unwrap()
            .extend(programs.iter().map(|p| (*p).to_string()));
        self
    }

    /// Installing `package` provides `commands` (default: the package name).
    pub fn provides(mut self, package: &str, commands: &[&str]) -> Self {
        self.provides.insert(
            package.to_string(),
            commands.iter().map(|c| (*c).to_string()).collect(),
        );
        self
    }

    /// Fail every call whose command line contains `needle`.
    pub fn fail_when(mut self, needle: &str) -> Self {
        self.failures.push(needle.to_string());
        self
    }

    /// Recorded command lines, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded command lines containing `needle`.
    pub fn calls_containing(&self, needle: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.contains(needle))
            .collect()
    }

    fn commands_for(&self, package: &str) -> Vec<String> {
        self.provides
            .get(package)
            .cloned()
            .unwrap_or_else(|| vec![package.to_string()])
    }

    fn env_listing(&self) -> String {
        let mut out = format!(
            "# conda environments:\n#\nbase                  *  {}\n",
            self.prefix.display()
        );
        for env in self.envs.lock().unwrap().iter() {
            out.push_str(&format!(
                "{env:<22}   {}\n",
                self.prefix.join("envs").join(env).display()
            ));
        }
        out
    }

    fn simulate(&self, program: &str, args: &[&str]) -> String {
        let packages = |from: usize| -> Vec<&str> {
            args.iter()
                .skip(from)
                .copied()
                .filter(|a| !a.starts_with("--"))
                .collect()
        };

        if program.ends_with("mamba") {
            match args {
                ["env", "list"] => return self.env_listing(),
                ["create", "-n", env, "-y"] => {
                    std::fs::create_dir_all(self.prefix.join("envs").join(env).join("bin"))
                        .unwrap();
                    self.envs.lock().unwrap().insert((*env).to_string());
                }
                ["install", "-n", env, "-y", ..] => {
                    let bin = self.prefix.join("envs").join(env).join("bin");
                    std::fs::create_dir_all(&bin).unwrap();
                    for package in packages(4) {
                        for command in self.commands_for(package) {
                            std::fs::write(bin.join(command), "").unwrap();
                        }
                    }
                }
                _ => {}
            }
        } else if program.ends_with("brew") && args.first() == Some(&"install") {
            let mut on_path = self.on_path.lock().unwrap();
            for package in packages(1) {
                on_path.extend(self.commands_for(package));
            }
        }
        String::new()
    }

    fn record(&self, program: &str, args: &[&str], env: &[(&str, &str)]) -> ExecResult {
        let mut parts: Vec<String> = env.iter().map(|(k, v)| format!("{k}={v}")).collect();
        parts.push(program.to_string());
        parts.extend(args.iter().map(|a| (*a).to_string()));
        let line = parts.join(" ");
        self.calls.lock().unwrap().push(line.clone());

        let success = !self.failures.iter().any(|n| line.contains(n.as_str()));
        let stdout = if success {
            self.simulate(program, args)
        } else {
            String::new()
        };
        ExecResult {
            stdout,
            stderr: String::new(),
            success,
            code: Some(i32::from(!success)),
        }
    }

    fn checked(result: ExecResult, program: &str) -> anyhow::Result<ExecResult> {
        if result.success {
            Ok(result)
        } else {
            anyhow::bail!("{program} failed (exit 1)")
        }
    }
}

impl Executor for RecordingExecutor {
    fn run(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        Self::checked(self.record(program, args, &[]), program)
    }

    fn run_with_env(
        &self,
        program: &str,
        args: &[&str],
        env: &[(&str, &str)],
    ) -> anyhow::Result<ExecResult> {
        Self::checked(self.record(program, args, env), program)
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        Ok(self.record(program, args, &[]))
    }

    fn locate(&self, program: &str) -> Option<PathBuf> {
        if self.on_path.lock().unwrap().contains(program) {
            return Some(PathBuf::from("/usr/bin").join(program));
        }
        let linked = self.user_local_bin.join(program);
        linked.exists().then_some(linked)
    }
}

/// A throwaway home directory with its environment context and logger.
pub struct Sandbox {
    pub home: tempfile::TempDir,
    pub env: EnvironmentContext,
    pub log: Logger,
}

impl Sandbox {
    /// Create a sandbox; `elevated` is the probed elevated-access result.
    pub fn new(elevated: bool) -> Self {
        let home = tempfile::tempdir().expect("create temp home");
        let log = Logger::with_log_file(None);
        let env = EnvironmentContext::at_home(home.path().to_path_buf(), elevated, &log)
            .expect("create ~/.local/bin");
        Self { home, env, log }
    }

    /// `<home>/miniforge3`.
    pub fn miniforge_prefix(&self) -> PathBuf {
        self.home.path().join("miniforge3")
    }

    /// `<home>/miniforge3/bin/mamba`.
    pub fn mamba(&self) -> PathBuf {
        self.miniforge_prefix().join("bin").join("mamba")
    }

    /// Pretend Miniforge is already installed.
    pub fn install_fake_miniforge(&self) {
        let mamba = self.mamba();
        std::fs::create_dir_all(mamba.parent().expect("bin dir")).expect("create bin dir");
        std::fs::write(&mamba, "").expect("write fake mamba");
    }

    /// `bin` directory of environment `env`.
    pub fn env_bin(&self, env: &str) -> PathBuf {
        self.miniforge_prefix().join("envs").join(env).join("bin")
    }

    /// Entries of `~/.local/bin`, sorted.
    pub fn linked(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.env.user_local_bin)
            .expect("read ~/.local/bin")
            .filter_map(Result::ok)
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Install context wired to `executor`.
    pub fn ctx<'a>(&'a self, executor: &'a RecordingExecutor) -> InstallContext<'a> {
        InstallContext {
            env: &self.env,
            executor,
            log: &self.log,
        }
    }
}

/// Write `<dir>/<name>.txt` with `content`.
pub fn write_list(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(format!("{name}.txt")), content).expect("write list");
}
