fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    #[cfg(not(unix))]
    compile_error!("process groups and sudo fallback need a unix host");

    // Build time ends up in `--version`
    let build_time = std::process::Command::new("date")
        .args(["-u", "+%Y-%m-%d %H:%M:%S UTC"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=BUILD_TIME={}", build_time);
}
