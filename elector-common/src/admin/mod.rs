pub mod pb {
    tonic::include_proto!("elector.admin");
}
