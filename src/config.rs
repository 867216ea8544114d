use std::str::FromStr;

use kallsyms_dec::{Arch, ArchitectureProfile, ProfileError};
use log::debug;

use crate::cli::{Args, Format};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArchSelection {
    Fixed(Arch),
    /// 64-bit first, then 32-bit
    Auto,
}

impl FromStr for ArchSelection {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(ArchSelection::Auto),
            other => other.parse().map(ArchSelection::Fixed),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub arch: ArchSelection,
    pub base_address: Option<u64>,
    pub align_boundary: Option<usize>,
    pub text_stext_offset: Option<u64>,
    pub format: Format,
    pub demangle: bool,
    pub resolve: Vec<u64>,
}

impl Config {
    pub fn from_args(args: &Args) -> Self {
        Self {
            arch: args.arch,
            base_address: args.base,
            // an unrepresentable boundary fails validation in attempts()
            align_boundary: args.align.map(|a| usize::try_from(a).unwrap_or(usize::MAX)),
            text_stext_offset: args.stext_offset,
            format: args.format,
            demangle: args.demangle,
            resolve: args.resolve.clone(),
        }
    }

    fn arches(&self) -> Vec<Arch> {
        match self.arch {
            ArchSelection::Fixed(arch) => vec![arch],
            ArchSelection::Auto => vec![Arch::Bits64, Arch::Bits32],
        }
    }

    fn profile(&self, arch: Arch) -> Result<ArchitectureProfile, ProfileError> {
        let mut profile = ArchitectureProfile::for_arch(arch);
        if let Some(align) = self.align_boundary {
            profile = profile.with_align_boundary(align)?;
        }
        if let Some(offset) = self.text_stext_offset {
            profile = profile.with_text_stext_offset(offset);
        }
        Ok(profile)
    }

    /// Profiles and bases to try, in order.
    ///
    /// An architecture whose overrides are invalid is skipped; the error
    /// is returned only when no architecture is left.
    pub fn attempts(&self) -> Result<Vec<(ArchitectureProfile, u64)>, ProfileError> {
        let mut attempts = vec![];
        let mut last_err = None;
        for arch in self.arches() {
            match self.profile(arch) {
                Ok(profile) => {
                    let base = self.base_address.unwrap_or(profile.default_text_base());
                    attempts.push((profile, base));
                }
                Err(err) => {
                    debug!("skipping {}-bit profile: {}", arch, err);
                    last_err = Some(err);
                }
            }
        }
        match last_err {
            Some(err) if attempts.is_empty() => Err(err),
            _ => Ok(attempts),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use kallsyms_dec::{Arch, ArchitectureProfile, ProfileError};

    use crate::{
        cli::Args,
        config::{ArchSelection, Config},
    };

    fn config(argv: &[&str]) -> Config {
        let mut full = vec!["static_kallsyms"];
        full.extend_from_slice(argv);
        full.push("Image");
        Config::from_args(&Args::try_parse_from(full).unwrap())
    }

    #[test]
    fn selection() {
        assert_eq!("auto".parse::<ArchSelection>(), Ok(ArchSelection::Auto));
        assert_eq!("32".parse::<ArchSelection>(), Ok(ArchSelection::Fixed(Arch::Bits32)));
        assert_eq!(
            "x86".parse::<ArchSelection>(),
            Err(ProfileError::UnknownArch("x86".to_string()))
        );
    }

    #[test]
    fn default_attempt() {
        assert_eq!(
            config(&[]).attempts(),
            Ok(vec![(ArchitectureProfile::BITS64, 0xffffffc000080000)])
        );
    }

    #[test]
    fn auto_tries_64_then_32() {
        assert_eq!(
            config(&["-a", "auto"]).attempts(),
            Ok(vec![
                (ArchitectureProfile::BITS64, 0xffffffc000080000),
                (ArchitectureProfile::BITS32, 0xc0008000),
            ])
        );
    }

    #[test]
    fn explicit_base_applies_to_every_attempt() {
        let attempts = config(&["-a", "auto", "-b", "10000"]).attempts().unwrap();

        assert!(attempts.iter().all(|(_, base)| *base == 0x10000));
    }

    #[test]
    fn overrides() {
        let attempts = config(&["-a", "32", "--align", "0x100", "--stext-offset", "0x40"])
            .attempts()
            .unwrap();

        assert_eq!(attempts.len(), 1);
        let (profile, base) = attempts[0];
        assert_eq!(profile.pointer_size(), 4);
        assert_eq!(profile.align_boundary(), 0x100);
        assert_eq!(profile.text_stext_offset(), 0x40);
        assert_eq!(base, 0xc0008000);
    }

    #[test]
    fn bad_align() {
        let c = config(&["--align", "24"]);

        assert!(matches!(c.attempts(), Err(ProfileError::AlignBoundary { .. })));
    }

    #[test]
    fn auto_skips_invalid_override() {
        let attempts = config(&["-a", "auto", "--align", "4"]).attempts().unwrap();

        assert_eq!(attempts.len(), 1);
        let (profile, base) = attempts[0];
        assert_eq!(profile.pointer_size(), 4);
        assert_eq!(profile.align_boundary(), 4);
        assert_eq!(base, 0xc0008000);
    }

    #[test]
    fn auto_fails_when_no_override_fits() {
        assert!(matches!(
            config(&["-a", "auto", "--align", "2"]).attempts(),
            Err(ProfileError::AlignBoundary { align: 2, .. })
        ));
    }
}
