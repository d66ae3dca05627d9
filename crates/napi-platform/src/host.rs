//! Host detection and the ordered list of targets it can load.

use crate::libc::LibcProbe;
use crate::target::{Arch, Platform, WASM32_WASI};

/// The operating system and CPU the installer runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    pub platform: Platform,
    pub arch: Arch,
}

impl Host {
    pub fn new(platform: Platform, arch: Arch) -> Self {
        Self { platform, arch }
    }

    /// Detect the running host.
    pub fn detect() -> Self {
        let host = Self::new(detect_platform(), detect_arch());
        tracing::debug!(platform = %host.platform, arch = %host.arch, "detected host");
        host
    }
}

fn detect_platform() -> Platform {
    if cfg!(target_os = "android") {
        Platform::Android
    } else if cfg!(target_os = "linux") {
        Platform::Linux
    } else if cfg!(target_os = "macos") {
        Platform::Darwin
    } else if cfg!(target_os = "windows") {
        Platform::Win32
    } else if cfg!(target_os = "freebsd") {
        Platform::FreeBsd
    } else {
        Platform::Other(std::env::consts::OS.to_string())
    }
}

fn detect_arch() -> Arch {
    let cpu_arch = sysinfo::System::cpu_arch();
    match arch_from_machine(&cpu_arch) {
        Arch::Other(_) => arch_from_machine(std::env::consts::ARCH),
        arch => arch,
    }
}

/// Map a machine name as reported by `uname -m` or the compiler.
fn arch_from_machine(machine: &str) -> Arch {
    match machine {
        "x86_64" | "amd64" => Arch::X64,
        "i386" | "i586" | "i686" | "x86" => Arch::Ia32,
        "aarch64" | "arm64" => Arch::Arm64,
        "arm" | "armv7l" | "armv7" => Arch::Arm,
        "riscv64" => Arch::Riscv64,
        "powerpc64" | "powerpc64le" | "ppc64le" | "ppc64" => Arch::Ppc64,
        "s390x" => Arch::S390x,
        "loongarch64" => Arch::Loong64,
        other => Arch::Other(other.to_string()),
    }
}

/// Native keys the host can load, most specific first.
///
/// The libc probe only runs for Linux hosts whose arch has a musl flavour.
pub fn native_targets(host: &Host, libc: &impl LibcProbe) -> Vec<String> {
    let key = |name: &str| vec![name.to_string()];
    let by_libc = |gnu: &str, musl: &str| {
        if libc.is_musl() {
            vec![musl.to_string()]
        } else {
            vec![gnu.to_string()]
        }
    };

    match (&host.platform, &host.arch) {
        (Platform::Android, Arch::Arm64) => key("android-arm64"),
        (Platform::Android, Arch::Arm) => key("android-arm-eabi"),

        (Platform::Win32, Arch::X64) => key("win32-x64-msvc"),
        (Platform::Win32, Arch::Ia32) => key("win32-ia32-msvc"),
        (Platform::Win32, Arch::Arm64) => key("win32-arm64-msvc"),

        (Platform::Darwin, arch) => {
            let mut targets = key("darwin-universal");
            match arch {
                Arch::X64 => targets.push("darwin-x64".to_string()),
                Arch::Arm64 => targets.push("darwin-arm64".to_string()),
                _ => {}
            }
            targets
        }

        (Platform::FreeBsd, Arch::X64) => key("freebsd-x64"),
        (Platform::FreeBsd, Arch::Arm64) => key("freebsd-arm64"),

        (Platform::Linux, Arch::X64) => by_libc("linux-x64-gnu", "linux-x64-musl"),
        (Platform::Linux, Arch::Arm64) => by_libc("linux-arm64-gnu", "linux-arm64-musl"),
        (Platform::Linux, Arch::Arm) => by_libc("linux-arm-gnueabihf", "linux-arm-musleabihf"),
        (Platform::Linux, Arch::Riscv64) => by_libc("linux-riscv64-gnu", "linux-riscv64-musl"),
        (Platform::Linux, Arch::Ppc64) => key("linux-ppc64-gnu"),
        (Platform::Linux, Arch::S390x) => key("linux-s390x-gnu"),

        _ => Vec::new(),
    }
}

/// Every key worth trying on this host: the native ones, then the portable
/// bytecode fallback.
pub fn acceptable_targets(host: &Host, libc: &impl LibcProbe) -> Vec<String> {
    let mut targets = native_targets(host, libc);
    targets.push(WASM32_WASI.to_string());
    targets
}
