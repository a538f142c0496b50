use std::cmp::Ordering;
use std::env;
use std::process::Command;

// Vector extensions that widen the lane blocks used by the element loops
#[derive(PartialEq, Eq, Debug)]
struct CpuFeature {
    name: &'static str,
    cfg_flag: &'static str,
    detected: bool,
}

impl CpuFeature {
    // Lowest number == highest priority
    fn priority(&self) -> usize {
        match self.name {
            "avx512f" => 0,
            "avx2" => 1,
            "sse4_1" => 2,
            "neon" => 3,
            _ => usize::MAX,
        }
    }

    fn features() -> Vec<CpuFeature> {
        ["sse4_1", "avx2", "avx512f", "neon"]
            .into_iter()
            .map(|name| CpuFeature {
                name,
                cfg_flag: match name {
                    "sse4_1" => "sse",
                    "avx512f" => "avx512",
                    other => other,
                },
                detected: false,
            })
            .collect()
    }
}

impl Ord for CpuFeature {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority().cmp(&other.priority())
    }
}

impl PartialOrd for CpuFeature {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

trait CpuFeatureDetector {
    fn detect_features(&self, features: &mut [CpuFeature]);
    fn is_applicable(&self) -> bool;
}

struct LinuxDetector;
impl CpuFeatureDetector for LinuxDetector {
    fn detect_features(&self, features: &mut [CpuFeature]) {
        if let Ok(cpuinfo) = std::fs::read_to_string("/proc/cpuinfo") {
            let contents = cpuinfo.to_lowercase();
            // aarch64 kernels report NEON as "asimd"
            let has_asimd = contents.contains("asimd");
            for feature in features.iter_mut() {
                feature.detected = contents.contains(feature.name)
                    || (feature.name == "neon" && has_asimd);
            }
        }
    }

    fn is_applicable(&self) -> bool {
        cfg!(target_os = "linux")
    }
}

struct MacOSDetector;
impl CpuFeatureDetector for MacOSDetector {
    fn detect_features(&self, features: &mut [CpuFeature]) {
        let output = Command::new("sysctl").args(["-a"]).output();

        if let Ok(output) = output {
            let contents = String::from_utf8_lossy(&output.stdout).to_lowercase();

            for feature in features.iter_mut() {
                feature.detected = match feature.name {
                    "avx512f" => contents.contains("hw.optional.avx512f: 1"),
                    "avx2" => contents.contains("hw.optional.avx2_0: 1"),
                    "sse4_1" => contents.contains("hw.optional.sse4_1: 1"),
                    "neon" => contents.contains("hw.optional.neon: 1"),
                    _ => false,
                };
            }
        }
    }

    fn is_applicable(&self) -> bool {
        cfg!(target_os = "macos")
    }
}

fn detect_cpu_features(features: &mut [CpuFeature]) {
    let detectors: Vec<Box<dyn CpuFeatureDetector>> =
        vec![Box::new(LinuxDetector), Box::new(MacOSDetector)];

    if let Some(detector) = detectors.into_iter().find(|d| d.is_applicable()) {
        detector.detect_features(features);
    }
}

fn main() {
    println!("cargo::rerun-if-changed=build.rs");

    let mut features = CpuFeature::features();

    // Probing the build host only describes the target for native builds
    let host = env::var("HOST").unwrap_or_default();
    let target = env::var("TARGET").unwrap_or_default();
    if host == target {
        detect_cpu_features(&mut features);
    }

    features.sort();

    let cfg_flag = features
        .iter()
        .find(|feature| feature.detected)
        .map(|feature| feature.cfg_flag)
        .unwrap_or("fallback");

    println!("cargo:rustc-cfg={cfg_flag}");

    for flag in ["avx512", "avx2", "sse", "neon", "fallback"] {
        println!("cargo::rustc-check-cfg=cfg({flag})");
    }
}
