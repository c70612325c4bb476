use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

pub struct TestProject {
    pub dir: TempDir,
    pub binary_path: String,
}

impl TestProject {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let binary_path = env!("CARGO_BIN_EXE_node-license-auditor").to_string();

        Self { dir, binary_path }
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn write(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        fs::create_dir_all(path.parent().expect("file has a parent")).expect("Failed to create dirs");
        fs::write(path, content).expect("Failed to write file");
    }

    /// Creates `<project>/package.json` depending on `deps`.
    pub fn init_node_project(&self, project: &str, deps: &[&str]) {
        let dependencies: Vec<String> = deps.iter().map(|d| format!("\"{}\": \"*\"", d)).collect();
        self.write(
            &format!("{}/package.json", project),
            &format!(
                "{{\"name\": \"{}\", \"version\": \"1.0.0\", \"dependencies\": {{{}}}}}",
                project,
                dependencies.join(", ")
            ),
        );
    }

    /// Installs a package under `<project>/node_modules` with the given license field.
    pub fn install(&self, project: &str, name: &str, license: Option<&str>) {
        let license = license
            .map(|l| format!(", \"license\": \"{}\"", l))
            .unwrap_or_default();
        self.write(
            &format!("{}/node_modules/{}/package.json", project, name),
            &format!(
                "{{\"name\": \"{}\", \"version\": \"1.0.0\", \"repository\": \"github:acme/{}\"{}}}",
                name,
                name.trim_start_matches('@').replace('/', "-"),
                license
            ),
        );
    }

    pub fn run_auditor(&self, project: &str, args: &[&str]) -> Output {
        self.command(project, args)
            .output()
            .expect("Failed to run node-license-auditor")
    }

    pub fn run_auditor_with_stdin(&self, project: &str, args: &[&str], stdin: &str) -> Output {
        let mut child = self
            .command(project, args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("Failed to run node-license-auditor");
        child
            .stdin
            .take()
            .expect("stdin is piped")
            .write_all(stdin.as_bytes())
            .expect("Failed to write stdin");
        child.wait_with_output().expect("Failed to wait for node-license-auditor")
    }

    fn command(&self, project: &str, args: &[&str]) -> Command {
        let mut command = Command::new(&self.binary_path);
        command
            .args(args)
            .current_dir(self.dir.path().join(project))
            .env_remove("RUST_LOG");
        command
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}
