//! OpenStack release and Ubuntu series knowledge.
//!
//! # Responsibilities
//! - Order OpenStack releases so "newer than" is a comparison
//! - Derive the release from an installation source or a package version
//! - Decide whether an upgrade is available

use std::fmt;
use std::str::FromStr;

use crate::error::CharmError;

/// OpenStack releases in chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OpenStackRelease {
    Essex,
    Folsom,
    Grizzly,
    Havana,
    Icehouse,
    Juno,
    Kilo,
    Liberty,
    Mitaka,
    Newton,
    Ocata,
    Pike,
    Queens,
    Rocky,
    Stein,
    Train,
    Ussuri,
    Victoria,
    Wallaby,
    Xena,
    Yoga,
}

use OpenStackRelease::*;

impl OpenStackRelease {
    pub const ALL: [OpenStackRelease; 21] = [
        Essex, Folsom, Grizzly, Havana, Icehouse, Juno, Kilo, Liberty, Mitaka, Newton, Ocata,
        Pike, Queens, Rocky, Stein, Train, Ussuri, Victoria, Wallaby, Xena, Yoga,
    ];

    pub fn codename(self) -> &'static str {
        match self {
            Essex => "essex",
            Folsom => "folsom",
            Grizzly => "grizzly",
            Havana => "havana",
            Icehouse => "icehouse",
            Juno => "juno",
            Kilo => "kilo",
            Liberty => "liberty",
            Mitaka => "mitaka",
            Newton => "newton",
            Ocata => "ocata",
            Pike => "pike",
            Queens => "queens",
            Rocky => "rocky",
            Stein => "stein",
            Train => "train",
            Ussuri => "ussuri",
            Victoria => "victoria",
            Wallaby => "wallaby",
            Xena => "xena",
            Yoga => "yoga",
        }
    }

    /// Release shipped in the Ubuntu archive of a series.
    pub fn for_series(series: &str) -> Option<Self> {
        let release = match series {
            "precise" => Essex,
            "quantal" => Folsom,
            "raring" => Grizzly,
            "saucy" => Havana,
            "trusty" => Icehouse,
            "utopic" => Juno,
            "vivid" => Kilo,
            "wily" => Liberty,
            "xenial" => Mitaka,
            "yakkety" => Newton,
            "zesty" => Ocata,
            "artful" => Pike,
            "bionic" => Queens,
            "cosmic" => Rocky,
            "disco" => Stein,
            "eoan" => Train,
            "focal" => Ussuri,
            "groovy" => Victoria,
            "hirsute" => Wallaby,
            "impish" => Xena,
            "jammy" => Yoga,
            _ => return None,
        };
        Some(release)
    }

    /// Release of an installed heat package from its Debian version.
    ///
    /// Heat used date based versions up to Kilo (`2015.1.0`) and semantic
    /// versions afterwards (`1:10.0.0-0ubuntu1` is Queens).
    pub fn from_heat_version(version: &str) -> Option<Self> {
        let upstream = version.split_once(':').map_or(version, |(_, v)| v);
        let mut parts = upstream.split(|c: char| c == '.' || c == '-' || c == '~');
        let major = parts.next()?;
        let minor = parts.next().unwrap_or("0");
        let release = match (major, minor) {
            ("2012", "1") => Essex,
            ("2012", "2") => Folsom,
            ("2013", "1") => Grizzly,
            ("2013", "2") => Havana,
            ("2014", "1") => Icehouse,
            ("2014", "2") => Juno,
            ("2015", "1") => Kilo,
            ("5", _) => Liberty,
            ("6", _) => Mitaka,
            ("7", _) => Newton,
            ("8", _) => Ocata,
            ("9", _) => Pike,
            ("10", _) => Queens,
            ("11", _) => Rocky,
            ("12", _) => Stein,
            ("13", _) => Train,
            ("14", _) => Ussuri,
            ("15", _) => Victoria,
            ("16", _) => Wallaby,
            ("17", _) => Xena,
            ("18", _) => Yoga,
            _ => return None,
        };
        Some(release)
    }

    /// Token cache (memcache) support for keystonemiddleware.
    pub fn enables_memcache(self) -> bool {
        self >= Mitaka
    }
}

impl fmt::Display for OpenStackRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.codename())
    }
}

impl FromStr for OpenStackRelease {
    type Err = CharmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.codename() == s)
            .ok_or_else(|| CharmError::UnknownInstallSource(s.to_string()))
    }
}

/// Ubuntu series in release order.
const SERIES: &[&str] = &[
    "precise", "quantal", "raring", "saucy", "trusty", "utopic", "vivid", "wily", "xenial",
    "yakkety", "zesty", "artful", "bionic", "cosmic", "disco", "eoan", "focal", "groovy",
    "hirsute", "impish", "jammy",
];

/// Whether `series` predates `other`. Unknown series count as newer.
pub fn series_older_than(series: &str, other: &str) -> bool {
    let rank = |s: &str| SERIES.iter().position(|x| *x == s).unwrap_or(usize::MAX);
    rank(series) < rank(other)
}

/// Parsed `openstack-origin` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallSource {
    /// Packages from the Ubuntu archive of the running series.
    Distro,
    /// Ubuntu Cloud Archive pocket.
    CloudArchive {
        series: String,
        release: OpenStackRelease,
        proposed: bool,
    },
    /// A PPA or raw deb line passed to add-apt-repository.
    Repository(String),
}

impl InstallSource {
    /// Parse an origin such as `cloud:trusty-liberty`,
    /// `cloud:xenial-ocata/proposed` or `cloud:trusty-updates/kilo`.
    pub fn parse(origin: &str) -> Result<Self, CharmError> {
        let origin = origin.trim();
        if origin.is_empty() || origin == "distro" || origin == "distro-proposed" {
            return Ok(InstallSource::Distro);
        }
        if origin.starts_with("ppa:") || origin.starts_with("deb ") || origin.starts_with("http") {
            return Ok(InstallSource::Repository(origin.to_string()));
        }
        let pocket = origin
            .strip_prefix("cloud:")
            .ok_or_else(|| CharmError::UnknownInstallSource(origin.to_string()))?;
        let (series, rest) = pocket
            .split_once('-')
            .ok_or_else(|| CharmError::UnknownInstallSource(origin.to_string()))?;

        let (release, proposed) = match rest.split_once('/') {
            Some(("updates", release)) => (release, false),
            Some(("proposed", release)) => (release, true),
            Some((release, "proposed")) => (release, true),
            Some((release, _)) => (release, false),
            None => (rest, false),
        };
        let release = release
            .parse()
            .map_err(|_| CharmError::UnknownInstallSource(origin.to_string()))?;

        Ok(InstallSource::CloudArchive {
            series: series.to_string(),
            release,
            proposed,
        })
    }

    /// OpenStack release this source provides on `series`.
    pub fn release(&self, series: &str) -> Option<OpenStackRelease> {
        match self {
            InstallSource::Distro => OpenStackRelease::for_series(series),
            InstallSource::CloudArchive { release, .. } => Some(*release),
            InstallSource::Repository(_) => None,
        }
    }
}

/// Release currently deployed: the installed heat package when present,
/// otherwise what the configured origin would install.
pub fn current_release(
    installed_version: Option<&str>,
    origin: &str,
    series: &str,
) -> Option<OpenStackRelease> {
    installed_version
        .and_then(OpenStackRelease::from_heat_version)
        .or_else(|| {
            InstallSource::parse(origin)
                .ok()
                .and_then(|s| s.release(series))
        })
}

/// An upgrade is available when the origin offers a newer release than the
/// installed packages.
pub fn upgrade_available(installed_version: Option<&str>, origin: &str, series: &str) -> bool {
    let installed = match installed_version.and_then(OpenStackRelease::from_heat_version) {
        Some(release) => release,
        None => return false,
    };
    match InstallSource::parse(origin).ok().and_then(|s| s.release(series)) {
        Some(available) => available > installed,
        None => false,
    }
}
