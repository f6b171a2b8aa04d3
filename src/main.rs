mod artfetch;
mod config;
mod marquee;
mod player;
mod render;
mod runtime;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
