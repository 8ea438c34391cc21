fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Prefer a system protoc when one is configured
    if std::env::var_os("PROTOC").is_none() {
        std::env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path()?);
    }

    tonic_build::configure()
        .build_server(true)
        .build_client(false)
        .compile_protos(&["proto/wifimap/wifimap.proto"], &["proto"])?;

    println!("cargo:rerun-if-changed=proto/wifimap/wifimap.proto");

    Ok(())
}
