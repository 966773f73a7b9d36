#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drink {
    name: String,
}

impl Drink {
    pub fn new(name: &str) -> Drink {
        Drink { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
