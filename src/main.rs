fn main() {
    dataset_probe_lib::run()
}
