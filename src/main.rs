fn main() {
    wfd::app::cli::run();
}
