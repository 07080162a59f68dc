/// Print mainnet and testnet addresses for the given phrases
use anyhow::{bail, Result};
use thorchain_client::chain::network::Prefix;
use thorchain_client::chain::wallet::{KeyDerivation, Secp256k1Keys, THOR_HD_PATH};

fn main() -> Result<()> {
    env_logger::init();

    let phrases: Vec<String> = std::env::args().skip(1).collect();
    if phrases.is_empty() {
        bail!("usage: derive_addresses \"<phrase>\" [\"<phrase>\" ...]");
    }

    println!("=== Deriving Thorchain addresses ({}) ===\n", THOR_HD_PATH);

    let keys = Secp256k1Keys::new();
    for (index, phrase) in phrases.iter().enumerate() {
        let key = match keys.derive_private_key(phrase) {
            Ok(key) => key,
            Err(e) => {
                println!("#{}: ERROR - {}", index + 1, e);
                continue;
            }
        };

        println!("#{}:", index + 1);
        println!("  pubkey:  {}", hex::encode(key.public_key()?.as_bytes()));
        for prefix in Prefix::ALL {
            println!("  {:<7}  {}", prefix.as_str(), keys.derive_address(&key, prefix.as_str())?);
        }
        log::debug!("Derived phrase #{}", index + 1);
    }

    Ok(())
}
