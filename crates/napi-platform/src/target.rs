//! Compiler target triples and their `platform-arch[-abi]` keys.
//!
//! A triple has the general shape `<arch><sub>-<vendor>-<sys>-<abi>`:
//!
//! - `arch`: base CPU architecture (`x86_64`, `i686`, `arm`, `riscv64gc`, ...)
//! - `vendor`: `unknown`, `apple`, `pc`, ... (never part of the key)
//! - `sys`: operating system (`linux`, `windows`, `darwin`, `none` for bare metal)
//! - `abi`: `gnu`, `musl`, `msvc`, `eabi`, ...
//!
//! Parsing is total. Names outside the known tables pass through verbatim so a
//! new compiler target still yields a usable key; only the sub-package lookup
//! that follows can fail.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

pub const WASM32: &str = "wasm32";
pub const WASI: &str = "wasi";
pub const WASM32_WASI: &str = "wasm32-wasi";
pub const EABI: &str = "eabi";

/// ABI slots that some toolchains use to carry the operating system.
const SUB_SYSTEMS: [&str; 2] = ["android", "ohos"];

/// Operating system, in the host runtime's naming.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Platform {
    Android,
    Darwin,
    FreeBsd,
    Linux,
    OpenHarmony,
    Wasi,
    Win32,
    Other(String),
}

impl Platform {
    /// Map the `sys` component of a triple.
    pub fn from_sys(sys: &str) -> Self {
        match sys {
            "windows" => Self::Win32,
            "ohos" => Self::OpenHarmony,
            other => other.parse().unwrap_or_else(|never: Infallible| match never {}),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Android => "android",
            Self::Darwin => "darwin",
            Self::FreeBsd => "freebsd",
            Self::Linux => "linux",
            Self::OpenHarmony => "openharmony",
            Self::Wasi => "wasi",
            Self::Win32 => "win32",
            Self::Other(name) => name,
        }
    }
}

impl FromStr for Platform {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "android" => Self::Android,
            "darwin" => Self::Darwin,
            "freebsd" => Self::FreeBsd,
            "linux" => Self::Linux,
            "openharmony" => Self::OpenHarmony,
            "wasi" => Self::Wasi,
            "win32" => Self::Win32,
            other => Self::Other(other.to_string()),
        })
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Platform {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// CPU architecture, in the host runtime's naming.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Arch {
    Arm,
    Arm64,
    Ia32,
    Loong64,
    Ppc64,
    Riscv64,
    S390x,
    Universal,
    Wasm32,
    X64,
    Other(String),
}

impl Arch {
    /// Map the `arch` component of a triple.
    pub fn from_cpu(cpu: &str) -> Self {
        match cpu {
            "x86_64" => Self::X64,
            "aarch64" => Self::Arm64,
            "i686" => Self::Ia32,
            "armv7" => Self::Arm,
            "riscv64gc" => Self::Riscv64,
            "powerpc64le" => Self::Ppc64,
            "loongarch64" => Self::Loong64,
            other => other.parse().unwrap_or_else(|never: Infallible| match never {}),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Arm => "arm",
            Self::Arm64 => "arm64",
            Self::Ia32 => "ia32",
            Self::Loong64 => "loong64",
            Self::Ppc64 => "ppc64",
            Self::Riscv64 => "riscv64",
            Self::S390x => "s390x",
            Self::Universal => "universal",
            Self::Wasm32 => "wasm32",
            Self::X64 => "x64",
            Self::Other(name) => name,
        }
    }
}

impl FromStr for Arch {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "arm" => Self::Arm,
            "arm64" => Self::Arm64,
            "ia32" => Self::Ia32,
            "loong64" => Self::Loong64,
            "ppc64" => Self::Ppc64,
            "riscv64" => Self::Riscv64,
            "s390x" => Self::S390x,
            "universal" => Self::Universal,
            "wasm32" => Self::Wasm32,
            "x64" => Self::X64,
            other => Self::Other(other.to_string()),
        })
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Arch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A parsed target triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub triple: String,
    #[serde(rename = "platformArchABI")]
    pub platform_arch_abi: String,
    pub platform: Platform,
    pub arch: Arch,
    pub abi: Option<String>,
}

impl Target {
    pub fn parse(raw: &str) -> Self {
        if is_wasi(raw) {
            return Self {
                triple: raw.to_string(),
                platform_arch_abi: WASM32_WASI.to_string(),
                platform: Platform::Wasi,
                arch: Arch::Wasm32,
                abi: Some(WASI.to_string()),
            };
        }

        // `armv7-linux-androideabi` segments as `armv7-linux-android-eabi`.
        let triple = match raw.strip_suffix(EABI) {
            Some(head) if !head.is_empty() && !head.ends_with('-') => format!("{head}-{EABI}"),
            _ => raw.to_string(),
        };

        let segments: Vec<&str> = triple.split('-').collect();
        let (cpu, mut sys, mut abi) = match segments.as_slice() {
            [cpu, sys] => (*cpu, *sys, None),
            // vendorless bare-metal triples: `eabi` is the ABI, never the system
            [cpu, sys, abi] if *abi == EABI => (*cpu, *sys, Some(*abi)),
            [cpu, _vendor, sys, rest @ ..] => (*cpu, *sys, rest.first().copied()),
            _ => (triple.as_str(), "unknown", None),
        };
        abi = abi.filter(|abi| !abi.is_empty());

        if let Some(sub) = abi.filter(|abi| SUB_SYSTEMS.contains(abi)) {
            sys = sub;
            abi = None;
        }

        let platform = Platform::from_sys(sys);
        let arch = Arch::from_cpu(cpu);
        let platform_arch_abi = match abi {
            Some(abi) => format!("{platform}-{arch}-{abi}"),
            None => format!("{platform}-{arch}"),
        };

        Self {
            triple: raw.to_string(),
            platform_arch_abi,
            platform,
            arch,
            abi: abi.map(str::to_string),
        }
    }

    /// Whether this is the portable bytecode target.
    pub fn is_wasi(&self) -> bool {
        self.platform_arch_abi == WASM32_WASI
    }
}

fn is_wasi(raw: &str) -> bool {
    raw == WASM32_WASI || raw == "wasm32-wasi-preview1-threads" || raw.starts_with("wasm32-wasip")
}

impl FromStr for Target {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.platform_arch_abi)
    }
}
