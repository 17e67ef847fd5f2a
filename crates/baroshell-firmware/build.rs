fn main() {
    println!("cargo:rerun-if-changed=.env");
    println!("cargo:rerun-if-env-changed=BAROSHELL_PROMPT");

    // A missing .env is fine, the defaults apply
    if let Ok(path) = dotenvy::dotenv() {
        println!("cargo:rerun-if-changed={}", path.display());
    }

    if let Ok(prompt) = std::env::var("BAROSHELL_PROMPT") {
        println!("cargo:rustc-env=BAROSHELL_PROMPT={prompt}");
    }

    println!("cargo:rustc-link-arg-bins=-Tlinkall.x");
}
