/// Build script for pendular
/// Embeds version and git metadata shown by `pendular version`

fn main() {
    println!("cargo:rerun-if-changed=Cargo.toml");
    println!("cargo:rerun-if-changed=.git/HEAD");

    // Absent outside a git checkout; the version output then omits the hash.
    if let Ok(output) = std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
    {
        if output.status.success() {
            if let Ok(hash) = String::from_utf8(output.stdout) {
                println!("cargo:rustc-env=PENDULAR_GIT_HASH={}", hash.trim());
            }
        }
    }
}
