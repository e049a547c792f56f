//! Protect a small page, print a share link, then open it the way a
//! returning visitor with an old remember-me key would.
//!
//! Run with: `cargo run --example protect_page`

use chrono::Utc;
use pagelock::artifact::ArtifactConfig;
use pagelock::keys;
use pagelock::remember::{self, MemoryRememberStore};
use pagelock::share::share_link;
use pagelock::{Codec, Salt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let codec = Codec::new();
    let salt = Salt::generate(codec.rng())?;
    let password = "correct horse battery staple";

    // 1. Encrypt once with the current profile.
    let key = codec.derive_key(password, &salt)?;
    let config = ArtifactConfig {
        encrypted_msg: codec.encode_with_key("<h1>Hello, member</h1>", &key)?,
        salt: salt.clone(),
        is_remember_enabled: true,
        remember_duration_in_days: 30,
        profile_id: codec.current_profile().id,
    };
    println!("artifact: {} bytes of JSON", config.to_json()?.len());
    println!("share link: {}", share_link("https://example.com/members.html", &key, true));

    // 2. A visitor remembered a key from the 1k-iteration era.
    let legacy = keys::derive_initial(password, &salt, &codec.chain().profiles()[0])?;
    let mut store = MemoryRememberStore::new();
    remember::remember(&mut store, &legacy, 30, Utc::now());

    // 3. Their key still opens the page and storage is upgraded.
    let candidate = remember::recall(&mut store, Utc::now()).ok_or("nothing remembered")?;
    let decoded = codec.decode(&config.encrypted_msg, &candidate, &salt)?;
    let upgraded = remember::apply_migration(&mut store, &decoded);
    println!(
        "decoded {:?} on attempt {} (stored key upgraded: {upgraded})",
        decoded.plaintext,
        decoded.attempt()
    );

    Ok(())
}
