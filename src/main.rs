#[tokio::main]
async fn main() {
    lesson_booking::run().await;
}
