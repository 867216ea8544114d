use std::os::unix::fs::PermissionsExt;
use std::{fs, path, process};

use anyhow::{ensure, Context};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all workspace tests with coverage and print a summary
    Testall {
        #[clap(last = true)]
        args: Vec<String>,
    },
}

const PROFILE_PREFIX: &str = "static_kallsyms";

#[derive(serde::Deserialize, Debug)]
struct CompilerMessage {
    reason: String,
    executable: Option<String>,
    target: Option<Target>,
    profile: Option<ArtifactProfile>,
}

#[derive(serde::Deserialize, Debug)]
struct Target {
    name: String,
}

#[derive(serde::Deserialize, Debug)]
struct ArtifactProfile {
    test: bool,
}

#[derive(serde::Deserialize, Debug)]
struct Coverage {
    data: Vec<CoverageData>,
}

#[derive(serde::Deserialize, Debug)]
struct CoverageData {
    files: Vec<CoverageFile>,
}

#[derive(serde::Deserialize, Debug)]
struct CoverageFile {
    filename: String,
    summary: CoverageSummary,
}

#[derive(serde::Deserialize, Debug)]
struct CoverageSummary {
    regions: CoverageSummaryItem,
    functions: CoverageSummaryItem,
    lines: CoverageSummaryItem,
}

#[derive(serde::Deserialize, Debug)]
struct CoverageSummaryItem {
    count: u32,
    covered: u32,
    percent: f64,
}

struct TestProgram {
    name: String,
    executable: String,
}

fn workspace_root() -> path::PathBuf {
    path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| path::PathBuf::from("."))
}

fn profraw_files(cov_dir: &path::Path) -> anyhow::Result<Vec<path::PathBuf>> {
    let mut files = vec![];
    for entry in cov_dir.read_dir()? {
        let p = entry?.path();
        if p.extension().map_or(false, |ext| ext == "profraw") {
            files.push(p);
        }
    }
    Ok(files)
}

fn run(cmd: &mut process::Command) -> anyhow::Result<()> {
    let status = cmd
        .status()
        .with_context(|| format!("failed to execute {:?}", cmd))?;
    ensure!(status.success(), "{:?} exited with {}", cmd, status);
    Ok(())
}

/* Remove coverage data of a previous run */
fn clean(cov_dir: &path::Path) -> anyhow::Result<()> {
    if !cov_dir.exists() {
        fs::create_dir(cov_dir)?;
    }
    for p in profraw_files(cov_dir)? {
        fs::remove_file(p)?;
    }
    let profdata = cov_dir.join(format!("{}.profdata", PROFILE_PREFIX));
    if profdata.exists() {
        fs::remove_file(profdata)?;
    }
    Ok(())
}

fn build_tests(root: &path::Path, args: &[String]) -> anyhow::Result<Vec<TestProgram>> {
    let mut cargo = process::Command::new("cargo");
    cargo
        .current_dir(root)
        .args(["test", "--workspace", "--no-run", "--message-format", "json"])
        .args(args)
        .env("RUSTFLAGS", "-C instrument-coverage")
        .stdout(process::Stdio::piped());
    let mut child = cargo
        .spawn()
        .with_context(|| format!("failed to spawn {:?}", cargo))?;

    let reader = child.stdout.take().context("cargo stdout not captured")?;
    let deserializer = serde_json::Deserializer::from_reader(reader);
    let mut programs = vec![];

    for msg in deserializer.into_iter::<CompilerMessage>() {
        let msg = msg?;
        let is_test = msg.profile.map_or(false, |p| p.test);
        if msg.reason != "compiler-artifact" || !is_test {
            continue;
        }
        if let Some(executable) = msg.executable {
            programs.push(TestProgram {
                name: msg.target.map_or_else(|| String::from("????"), |t| t.name),
                executable,
            });
        }
    }

    let status = child.wait()?;
    ensure!(status.success(), "{:?} exited with {}", cargo, status);
    Ok(programs)
}

fn run_tests(cov_dir: &path::Path, programs: &[TestProgram]) -> anyhow::Result<()> {
    for prog in programs {
        println!("**** {} ****", prog.name);
        run(process::Command::new(&prog.executable).env(
            "LLVM_PROFILE_FILE",
            cov_dir.join(format!("{}-%m.profraw", PROFILE_PREFIX)),
        ))?;
    }
    Ok(())
}

fn llvm_tool_args(programs: &[TestProgram], args: &[&str]) -> Vec<String> {
    let mut all: Vec<String> = args.iter().map(|&s| s.into()).collect();
    all.push("--ignore-filename-regex=/.cargo/registry".into());
    all.push("--ignore-filename-regex=/library/std/".into());
    all.push(format!("--instr-profile={}.profdata", PROFILE_PREFIX));
    for prog in programs {
        all.push("--object".into());
        all.push(prog.executable.clone());
    }
    all
}

fn merge_profiles(cov_dir: &path::Path) -> anyhow::Result<()> {
    let profdata = format!("{}.profdata", PROFILE_PREFIX);
    run(process::Command::new("cargo")
        .current_dir(cov_dir)
        .args(["profdata", "--", "merge", "--sparse", "-o", profdata.as_str()])
        .args(profraw_files(cov_dir)?))
}

fn render_html(cov_dir: &path::Path, programs: &[TestProgram]) -> anyhow::Result<()> {
    run(process::Command::new("cargo")
        .current_dir(cov_dir)
        .args(llvm_tool_args(
            programs,
            &[
                "cov", "--",
                "show",
                "--show-instantiations",
                "--show-line-counts-or-regions",
                "--Xdemangler=rustfilt",
                "--format=html",
                "--output-dir=.",
            ],
        )))
}

fn export_summary(cov_dir: &path::Path, programs: &[TestProgram]) -> anyhow::Result<Coverage> {
    let mut cargo = process::Command::new("cargo");
    cargo
        .current_dir(cov_dir)
        .args(llvm_tool_args(programs, &["cov", "--", "export", "--format=text"]));

    let output = cargo
        .output()
        .with_context(|| format!("failed to execute {:?}", cargo))?;
    ensure!(output.status.success(), "{:?} exited with {}", cargo, output.status);

    Ok(serde_json::from_slice(&output.stdout)?)
}

fn print_summary(root: &path::Path, cov: Coverage) {
    use prettytable::format::{FormatBuilder, LinePosition, LineSeparator};
    use prettytable::{color, Attr, Cell, Row};

    let mut table = prettytable::Table::new();
    table.set_format(
        FormatBuilder::new()
            .separator(LinePosition::Title,  LineSeparator::new('-', '+', '+', '+'))
            .separator(LinePosition::Bottom, LineSeparator::new('-', '+', '+', '+'))
            .separator(LinePosition::Top,    LineSeparator::new('-', '+', '+', '+'))
            .padding(2, 2)
            .build());
    table.set_titles(Row::new(vec![
        Cell::new("Filename"),
        Cell::new("Regions"),
        Cell::new("Functions"),
        Cell::new("Lines"),
    ]));

    let rootdir = format!("{}/", root.display());
    for data in cov.data {
        for file in data.files {
            let filename = file
                .filename
                .strip_prefix(&rootdir)
                .unwrap_or(&file.filename)
                .to_string();

            let mut row = Row::empty();
            row.add_cell(Cell::new(&filename));

            for col in [file.summary.regions, file.summary.functions, file.summary.lines] {
                let text = format!("{:.2} ({}/{})", col.percent, col.covered, col.count);
                let c = if col.covered == col.count {
                    color::GREEN
                } else if col.percent >= 80. {
                    color::YELLOW
                } else {
                    color::RED
                };
                row.add_cell(Cell::new(&text).with_style(Attr::ForegroundColor(c)));
            }

            table.add_row(row);
        }
    }
    table.printstd();
}

fn fix_permission(p: &path::Path) {
    let mode = if p.is_dir() { 0o755 } else { 0o644 };
    let _ = fs::set_permissions(p, fs::Permissions::from_mode(mode));

    if let Ok(entries) = fs::read_dir(p) {
        for e in entries.flatten() {
            fix_permission(&e.path());
        }
    }
}

fn cargo_testall(args: &[String]) -> anyhow::Result<()> {
    let root = workspace_root();
    let cov_dir = root.join("cov");

    clean(&cov_dir)?;
    let programs = build_tests(&root, args)?;
    run_tests(&cov_dir, &programs)?;
    merge_profiles(&cov_dir)?;
    render_html(&cov_dir, &programs)?;
    print_summary(&root, export_summary(&cov_dir, &programs)?);
    fix_permission(&cov_dir);

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Testall { args }) => cargo_testall(args),
        None => Ok(()),
    }
}
