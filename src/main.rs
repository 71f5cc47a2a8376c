#[macro_use]
extern crate rocket;

#[launch]
fn rocket() -> _ {
    let rocket = tweet_reach::rocket();
    log::info!("Starting Tweet Reach API Server");
    rocket
}
