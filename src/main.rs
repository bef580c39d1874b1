fn main() {
    cppt_review_lib::run()
}
