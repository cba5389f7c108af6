//! Build and run tooling for dropwpbt.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use xshell::{cmd, Shell};

/// The target the UEFI image is built for.
const TARGET: &str = "x86_64-unknown-uefi";

/// The path firmware boots from on removable media.
const FALLBACK_BOOT_PATH: &str = "EFI/BOOT/BOOTX64.EFI";

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Builds the UEFI image.
    Build(BuildArgs),
    /// Builds the UEFI image and boots it in QEMU.
    Run(RunArgs),
}

#[derive(Args, Clone, Debug)]
struct BuildArgs {
    /// Builds with the release profile.
    #[arg(long)]
    release: bool,
    /// Features of the image to enable.
    #[arg(long, value_enum, value_delimiter = ',')]
    features: Vec<Feature>,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    build: BuildArgs,
    /// The OVMF firmware code image.
    #[arg(long, env = "OVMF_CODE")]
    ovmf: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Feature {
    Chainload,
    Debug,
    Verbose,
    SerialLogging,
}

impl Feature {
    /// Returns the Cargo feature name.
    fn name(self) -> &'static str {
        match self {
            Feature::Chainload => "chainload",
            Feature::Debug => "debug",
            Feature::Verbose => "verbose",
            Feature::SerialLogging => "serial_logging",
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let sh = Shell::new()?;
    sh.change_dir(project_root());

    match cli.command {
        Command::Build(args) => build(&sh, &args).map(|_| ()),
        Command::Run(args) => run(&sh, &args),
    }
}

/// Builds the image, returning its path.
fn build(sh: &Shell, args: &BuildArgs) -> anyhow::Result<PathBuf> {
    let release = args.release.then_some("--release");
    let features = feature_flags(&args.features);

    cmd!(sh, "cargo build -p dropwpbt --target {TARGET} {release...} {features...}")
        .run()
        .context("failed to build dropwpbt")?;

    Ok(image_path(&project_root(), args.release))
}

/// Lays out an EFI system partition holding the image and boots it.
fn run(sh: &Shell, args: &RunArgs) -> anyhow::Result<()> {
    let image = build(sh, &args.build)?;

    let esp = project_root().join("target").join("esp");
    let boot_path = esp.join(FALLBACK_BOOT_PATH);
    let boot_dir = boot_path
        .parent()
        .context("boot path has no parent directory")?;
    sh.create_dir(boot_dir)?;
    sh.copy_file(&image, &boot_path)
        .with_context(|| format!("failed to copy {}", image.display()))?;

    let ovmf = format!(
        "if=pflash,format=raw,readonly=on,file={}",
        args.ovmf.display()
    );
    let drive = format!("format=raw,file=fat:rw:{}", esp.display());

    cmd!(
        sh,
        "qemu-system-x86_64
            -machine q35
            -m 256M
            -serial stdio
            -net none
            -drive {ovmf}
            -drive {drive}"
    )
    .run()
    .context("failed to run QEMU")?;

    Ok(())
}

/// Returns the Cargo arguments enabling `features`.
fn feature_flags(features: &[Feature]) -> Vec<String> {
    if features.is_empty() {
        return Vec::new();
    }

    let names = features
        .iter()
        .map(|feature| feature.name())
        .collect::<Vec<_>>()
        .join(",");

    vec!["--features".to_owned(), names]
}

/// Returns the path Cargo places the image at.
fn image_path(root: &Path, release: bool) -> PathBuf {
    root.join("target")
        .join(TARGET)
        .join(if release { "release" } else { "debug" })
        .join("dropwpbt.efi")
}

fn project_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

    manifest_dir
        .parent()
        .unwrap_or(manifest_dir)
        .to_path_buf()
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use clap::{CommandFactory, Parser};

    use super::{feature_flags, image_path, Cli, Command, Feature};

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn features_are_comma_separated() {
        let cli = Cli::parse_from(["xtask", "build", "--features", "chainload,serial-logging"]);
        let Command::Build(args) = cli.command else {
            panic!("expected the build command");
        };

        assert_eq!(args.features, [Feature::Chainload, Feature::SerialLogging]);
        assert_eq!(
            feature_flags(&args.features),
            ["--features", "chainload,serial_logging"]
        );
        assert!(feature_flags(&[]).is_empty());
    }

    #[test]
    fn image_path_follows_the_profile() {
        let root = Path::new("/work");

        assert_eq!(
            image_path(root, false),
            Path::new("/work/target/x86_64-unknown-uefi/debug/dropwpbt.efi")
        );
        assert_eq!(
            image_path(root, true),
            Path::new("/work/target/x86_64-unknown-uefi/release/dropwpbt.efi")
        );
    }
}
