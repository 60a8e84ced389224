//! Target CPU architectures.

/// Android CPU architecture a frida-server binary is built for.
///
/// The module ships one server per architecture; each one is fetched and
/// unpacked independently during the fill phase.
///
/// # Example
///
/// ```
/// use magiskfrida_schema::Arch;
///
/// assert_eq!(Arch::ALL.len(), 4);
/// assert_eq!("x86_64".parse::<Arch>().unwrap(), Arch::X86_64);
/// assert_eq!(Arch::Arm64.server_file_name(), "frida-server-arm64");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    /// 32-bit ARM (`armeabi-v7a`)
    Arm,
    /// 64-bit ARM (`arm64-v8a`)
    Arm64,
    /// 32-bit Intel
    X86,
    /// 64-bit Intel
    #[serde(rename = "x86_64")]
    X86_64,
}

impl Arch {
    /// Every architecture bundled into the module, in build order.
    pub const ALL: [Arch; 4] = [Arch::Arm, Arch::Arm64, Arch::X86, Arch::X86_64];

    /// Name used in upstream asset names and on-disk paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Arm => "arm",
            Self::Arm64 => "arm64",
            Self::X86 => "x86",
            Self::X86_64 => "x86_64",
        }
    }

    /// File name of the unpacked server inside the module's `files/` directory.
    pub fn server_file_name(&self) -> String {
        format!("frida-server-{}", self.as_str())
    }
}

impl std::fmt::Display for Arch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Arch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "arm" | "armeabi-v7a" => Ok(Self::Arm),
            "arm64" | "aarch64" | "arm64-v8a" => Ok(Self::Arm64),
            "x86" | "i686" => Ok(Self::X86),
            "x86_64" | "amd64" => Ok(Self::X86_64),
            _ => Err(format!("Unknown architecture: {s}")),
        }
    }
}
