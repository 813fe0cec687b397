use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-env-changed=ASCEND_TOOLKIT_HOME");
    println!("cargo:rerun-if-env-changed=ASCEND_HOME_PATH");
    println!("cargo:rerun-if-env-changed=DIOPI_LIB_DIR");

    // Host-only builds (RecordingRuntime) need no native libraries
    if env::var_os("CARGO_FEATURE_ASCEND").is_none() {
        return;
    }

    let toolkit_root = env::var("ASCEND_TOOLKIT_HOME")
        .or_else(|_| env::var("ASCEND_HOME_PATH"))
        .unwrap_or_else(|_| "/usr/local/Ascend/ascend-toolkit/latest".to_string());

    let lib_dir = PathBuf::from(&toolkit_root).join("lib64");
    if !lib_dir.exists() {
        println!(
            "cargo:warning=Ascend toolkit libraries not found at {}. Set ASCEND_TOOLKIT_HOME.",
            lib_dir.display()
        );
    }
    println!("cargo:rustc-link-search=native={}", lib_dir.display());
    println!("cargo:rustc-link-lib=dylib=ascendcl");
    println!("cargo:rustc-link-lib=dylib=acl_op_compiler");

    // diopiGetTensor* / diopiGetStream are exported by the framework-side runtime
    if let Ok(diopi_dir) = env::var("DIOPI_LIB_DIR") {
        println!("cargo:rustc-link-search=native={}", diopi_dir);
        println!("cargo:rustc-link-lib=dylib=diopirt");
    }
}
