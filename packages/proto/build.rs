fn main() -> Result<(), Box<dyn std::error::Error>> {
    // tonic-build shells out to protoc; point it at the vendored binary so
    // builds do not depend on a system-wide protobuf installation.
    std::env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path()?);

    tonic_build::configure()
        .build_client(true)
        .compile_protos(&["proto/storegate.proto"], &["proto"])?;

    println!("cargo:rerun-if-changed=proto/storegate.proto");
    Ok(())
}
