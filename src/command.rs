//! Verifier command descriptions.
//!
//! Builds the `cargo-kani` argument vectors for verifying a harness,
//! generating a concrete playback test from it, and running that test.
//! Nothing here spawns a process or quotes for a shell.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::VerifierConfig;
use crate::naming::HarnessTarget;
use crate::parser::{HarnessFlags, HarnessMetadata};

const PACKAGE_FLAG: &str = "-p";
const LONG_PACKAGE_FLAG: &str = "--package";
const HARNESS_FLAG: &str = "--harness";
const TESTS_FLAG: &str = "--tests";
const UNSTABLE_FLAG: &str = "-Z";
const STUBBING_FEATURE: &str = "stubbing";
const CONCRETE_PLAYBACK_FEATURE: &str = "concrete-playback";
const CONCRETE_PLAYBACK_INPLACE: &str = "--concrete-playback=inplace";
const PLAYBACK_SUBCOMMAND: &str = "playback";
const NOCAPTURE_FLAG: &str = "--nocapture";

/// What a harness command asks the verifier to do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HarnessAction {
    #[default]
    Verify,
    /// Verify and write a unit test reproducing any counterexample into the
    /// source file.
    ConcretePlayback,
}

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifierCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl VerifierCommand {
    /// Command verifying the harness named `harness_name`.
    pub fn new(config: &VerifierConfig, harness_name: &str, flags: HarnessFlags) -> Self {
        let mut args = Vec::new();
        push_package(&mut args, config, PACKAGE_FLAG);
        args.push(HARNESS_FLAG.to_string());
        args.push(harness_name.to_string());
        if flags.is_test_style {
            args.push(TESTS_FLAG.to_string());
        }
        if flags.has_stub {
            push_unstable(&mut args, STUBBING_FEATURE);
        }
        args.extend(config.extra_args.iter().cloned());

        VerifierCommand {
            program: config.cargo_kani.clone(),
            args,
        }
    }

    /// Command generating a concrete playback test for `harness_name`.
    pub fn concrete_playback(
        config: &VerifierConfig,
        harness_name: &str,
        flags: HarnessFlags,
    ) -> Self {
        let mut args = Vec::new();
        if flags.is_test_style {
            args.push(TESTS_FLAG.to_string());
        }
        args.push(HARNESS_FLAG.to_string());
        args.push(harness_name.to_string());
        push_package(&mut args, config, PACKAGE_FLAG);
        push_unstable(&mut args, CONCRETE_PLAYBACK_FEATURE);
        args.push(CONCRETE_PLAYBACK_INPLACE.to_string());
        if flags.has_stub {
            push_unstable(&mut args, STUBBING_FEATURE);
        }
        args.extend(config.extra_args.iter().cloned());

        VerifierCommand {
            program: config.cargo_kani.clone(),
            args,
        }
    }

    /// Command running a generated playback test by its function name.
    pub fn playback_test(config: &VerifierConfig, test_name: &str) -> Self {
        let mut args = vec![PLAYBACK_SUBCOMMAND.to_string()];
        push_package(&mut args, config, LONG_PACKAGE_FLAG);
        push_unstable(&mut args, CONCRETE_PLAYBACK_FEATURE);
        args.push("--".to_string());
        args.push(test_name.to_string());
        args.push(NOCAPTURE_FLAG.to_string());

        VerifierCommand {
            program: config.cargo_kani.clone(),
            args,
        }
    }

    pub fn for_action(
        config: &VerifierConfig,
        harness_name: &str,
        flags: HarnessFlags,
        action: HarnessAction,
    ) -> Self {
        match action {
            HarnessAction::Verify => Self::new(config, harness_name, flags),
            HarnessAction::ConcretePlayback => {
                Self::concrete_playback(config, harness_name, flags)
            }
        }
    }

    /// One command per name in `target`'s retry order.
    pub fn for_target(
        config: &VerifierConfig,
        target: &HarnessTarget,
        flags: HarnessFlags,
        action: HarnessAction,
    ) -> Vec<Self> {
        target
            .attempts()
            .into_iter()
            .map(|name| VerifierCommand::for_action(config, name, flags, action))
            .collect()
    }

    /// Commands for a harness declared in `file`.
    pub fn for_harness(
        config: &VerifierConfig,
        harness: &HarnessMetadata,
        file: &Path,
        action: HarnessAction,
    ) -> Vec<Self> {
        Self::for_target(config, &HarnessTarget::new(harness, file), harness.flags, action)
    }
}

fn push_package(args: &mut Vec<String>, config: &VerifierConfig, flag: &str) {
    if let Some(package) = &config.package {
        args.push(flag.to_string());
        args.push(package.clone());
    }
}

fn push_unstable(args: &mut Vec<String>, feature: &str) {
    args.push(UNSTABLE_FLAG.to_string());
    args.push(feature.to_string());
}

impl fmt::Display for VerifierCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}
