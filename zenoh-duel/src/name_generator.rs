/// Readable player names
use markov_namegen::{CharacterChainGenerator, RandomTextGenerator};

/// Training data for the name chain
const TRAINING_NAMES: &[&str] = &[
    "Aldric", "Theron", "Gareth", "Mirabel", "Isolde", "Lysander", "Elowen", "Rowan",
    "Caelum", "Astrid", "Eirik", "Freya", "Magnus", "Sigrid", "Bjorn", "Ingrid",
    "Apollo", "Diana", "Atlas", "Selene", "Orion", "Luna", "Phoenix", "Aurora",
    "Finn", "Maeve", "Cormac", "Niamh", "Declan", "Siobhan", "Aidan", "Brigid",
    "Zephyr", "Ember", "Storm", "Raven", "Wolf", "Hawk", "Fox", "Cedar",
];

fn create_name_generator() -> CharacterChainGenerator {
    CharacterChainGenerator::builder()
        .with_order(2)
        .with_prior(0.01)
        .train(TRAINING_NAMES.iter().copied())
        .build()
}

/// Pronounceable random name, alphanumeric only and at most 12 chars
pub fn generate_random_name() -> String {
    let mut generator = create_name_generator();
    loop {
        let name = generator.generate_one();
        if !name.is_empty() && name.len() <= 12 && name.chars().all(|c| c.is_alphanumeric()) {
            return name;
        }
    }
}

/// Random name with a numeric suffix, like "Theron_42"
pub fn generate_unique_name() -> String {
    let base_name = generate_random_name();
    let suffix: u16 = rand::random::<u16>() % 1000;
    format!("{}_{}", base_name, suffix)
}
