//! Joker 表
//!
//! 搜尋器只關心生成面向：每張 Joker 的稀有度、在稀有度池內的順序、
//! 以及版本/貼紙修飾。池順序就是 PRNG 索引契約，不可重排。
//!
//! 索引配置（稀有度連續區段，池序即區段內偏移）：
//! - Common:    0..=59
//! - Uncommon:  60..=124
//! - Rare:      125..=144
//! - Legendary: 145..=149（只能透過 Soul 卡出現）

use super::cards::Edition;

/// Joker 總數
pub const JOKER_COUNT: usize = 150;

/// 稀有度
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Legendary,
}

/// Joker 唯一識別碼
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum JokerId {
    // ========================================================================
    // Common (0..=59)
    // ========================================================================
    Joker = 0,
    GreedyJoker = 1,
    LustyJoker = 2,
    WrathfulJoker = 3,
    GluttonousJoker = 4,
    JollyJoker = 5,
    ZanyJoker = 6,
    MadJoker = 7,
    CrazyJoker = 8,
    DrollJoker = 9,
    SlyJoker = 10,
    WilyJoker = 11,
    CleverJoker = 12,
    DeviousJoker = 13,
    CraftyJoker = 14,
    HalfJoker = 15,
    CreditCard = 16,
    Banner = 17,
    MysticSummit = 18,
    EightBall = 19,
    Misprint = 20,
    RaisedFist = 21,
    ChaosTheClown = 22,
    ScaryFace = 23,
    AbstractJoker = 24,
    DelayedGratification = 25,
    GrosMichel = 26,
    EvenSteven = 27,
    OddTodd = 28,
    Scholar = 29,
    BusinessCard = 30,
    Supernova = 31,
    RideTheBus = 32,
    Egg = 33,
    Runner = 34,
    IceCream = 35,
    Splash = 36,
    BlueJoker = 37,
    FacelessJoker = 38,
    GreenJoker = 39,
    Superposition = 40,
    ToDoList = 41,
    Cavendish = 42,
    RedCard = 43,
    SquareJoker = 44,
    RiffRaff = 45,
    Photograph = 46,
    MailInRebate = 47,
    Hallucination = 48,
    FortuneTeller = 49,
    Juggler = 50,
    Drunkard = 51,
    GoldenJoker = 52,
    Popcorn = 53,
    WalkieTalkie = 54,
    SmileyFace = 55,
    GoldenTicket = 56,
    Swashbuckler = 57,
    HangingChad = 58,
    ShootTheMoon = 59,

    // ========================================================================
    // Uncommon (60..=124)
    // ========================================================================
    JokerStencil = 60,
    FourFingers = 61,
    Mime = 62,
    CeremonialDagger = 63,
    MarbleJoker = 64,
    LoyaltyCard = 65,
    Dusk = 66,
    Fibonacci = 67,
    SteelJoker = 68,
    Hack = 69,
    Pareidolia = 70,
    SpaceJoker = 71,
    Burglar = 72,
    Blackboard = 73,
    SixthSense = 74,
    Constellation = 75,
    Hiker = 76,
    CardSharp = 77,
    Madness = 78,
    Seance = 79,
    Shortcut = 80,
    Hologram = 81,
    CloudNine = 82,
    Rocket = 83,
    MidasMask = 84,
    Luchador = 85,
    GiftCard = 86,
    TurtleBean = 87,
    Erosion = 88,
    ReservedParking = 89,
    ToTheMoon = 90,
    StoneJoker = 91,
    LuckyCat = 92,
    Bull = 93,
    DietCola = 94,
    TradingCard = 95,
    FlashCard = 96,
    SpareTrousers = 97,
    Ramen = 98,
    Seltzer = 99,
    Castle = 100,
    MrBones = 101,
    Acrobat = 102,
    SockAndBuskin = 103,
    Troubadour = 104,
    Certificate = 105,
    SmearedJoker = 106,
    Throwback = 107,
    RoughGem = 108,
    Bloodstone = 109,
    Arrowhead = 110,
    OnyxAgate = 111,
    GlassJoker = 112,
    Showman = 113,
    FlowerPot = 114,
    MerryAndy = 115,
    OopsAllSixes = 116,
    TheIdol = 117,
    SeeingDouble = 118,
    Matador = 119,
    Satellite = 120,
    Cartomancer = 121,
    Astronomer = 122,
    BurntJoker = 123,
    Bootstraps = 124,

    // ========================================================================
    // Rare (125..=144)
    // ========================================================================
    Dna = 125,
    Vampire = 126,
    Vagabond = 127,
    Baron = 128,
    Obelisk = 129,
    BaseballCard = 130,
    AncientJoker = 131,
    Campfire = 132,
    Blueprint = 133,
    WeeJoker = 134,
    HitTheRoad = 135,
    TheDuo = 136,
    TheTrio = 137,
    TheFamily = 138,
    TheOrder = 139,
    TheTribe = 140,
    Stuntman = 141,
    InvisibleJoker = 142,
    Brainstorm = 143,
    DriversLicense = 144,

    // ========================================================================
    // Legendary (145..=149)
    // ========================================================================
    Canio = 145,
    Triboulet = 146,
    Yorick = 147,
    Chicot = 148,
    Perkeo = 149,
}

const COMMON_BASE: usize = 0;
const UNCOMMON_BASE: usize = 60;
const RARE_BASE: usize = 125;
const LEGENDARY_BASE: usize = 145;

/// Common Joker 數量
pub const COMMON_COUNT: usize = UNCOMMON_BASE - COMMON_BASE;
/// Uncommon Joker 數量
pub const UNCOMMON_COUNT: usize = RARE_BASE - UNCOMMON_BASE;
/// Rare Joker 數量
pub const RARE_COUNT: usize = LEGENDARY_BASE - RARE_BASE;
/// Legendary Joker 數量
pub const LEGENDARY_COUNT: usize = JOKER_COUNT - LEGENDARY_BASE;

impl JokerId {
    pub fn to_index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<JokerId> {
        if index < JOKER_COUNT {
            // 變體值 0..150 連續
            Some(unsafe { std::mem::transmute::<u8, JokerId>(index as u8) })
        } else {
            None
        }
    }

    pub fn rarity(self) -> Rarity {
        match self.to_index() {
            i if i < UNCOMMON_BASE => Rarity::Common,
            i if i < RARE_BASE => Rarity::Uncommon,
            i if i < LEGENDARY_BASE => Rarity::Rare,
            _ => Rarity::Legendary,
        }
    }

    /// 稀有度池（順序即 PRNG 索引契約）
    pub fn pool(rarity: Rarity) -> impl ExactSizeIterator<Item = JokerId> + Clone {
        let (base, count) = match rarity {
            Rarity::Common => (COMMON_BASE, COMMON_COUNT),
            Rarity::Uncommon => (UNCOMMON_BASE, UNCOMMON_COUNT),
            Rarity::Rare => (RARE_BASE, RARE_COUNT),
            Rarity::Legendary => (LEGENDARY_BASE, LEGENDARY_COUNT),
        };
        (base..base + count).map(|i| JokerId::from_index(i).unwrap())
    }

    /// 池內第 n 個（生成流用這個做索引抽取）
    pub fn from_pool_index(rarity: Rarity, index: usize) -> JokerId {
        let base = match rarity {
            Rarity::Common => COMMON_BASE,
            Rarity::Uncommon => UNCOMMON_BASE,
            Rarity::Rare => RARE_BASE,
            Rarity::Legendary => LEGENDARY_BASE,
        };
        JokerId::from_index(base + index).expect("pool index out of range")
    }

    /// 稀有度池大小
    pub fn pool_size(rarity: Rarity) -> usize {
        match rarity {
            Rarity::Common => COMMON_COUNT,
            Rarity::Uncommon => UNCOMMON_COUNT,
            Rarity::Rare => RARE_COUNT,
            Rarity::Legendary => LEGENDARY_COUNT,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            JokerId::Joker => "Joker",
            JokerId::GreedyJoker => "Greedy Joker",
            JokerId::LustyJoker => "Lusty Joker",
            JokerId::WrathfulJoker => "Wrathful Joker",
            JokerId::GluttonousJoker => "Gluttonous Joker",
            JokerId::JollyJoker => "Jolly Joker",
            JokerId::ZanyJoker => "Zany Joker",
            JokerId::MadJoker => "Mad Joker",
            JokerId::CrazyJoker => "Crazy Joker",
            JokerId::DrollJoker => "Droll Joker",
            JokerId::SlyJoker => "Sly Joker",
            JokerId::WilyJoker => "Wily Joker",
            JokerId::CleverJoker => "Clever Joker",
            JokerId::DeviousJoker => "Devious Joker",
            JokerId::CraftyJoker => "Crafty Joker",
            JokerId::HalfJoker => "Half Joker",
            JokerId::CreditCard => "Credit Card",
            JokerId::Banner => "Banner",
            JokerId::MysticSummit => "Mystic Summit",
            JokerId::EightBall => "8 Ball",
            JokerId::Misprint => "Misprint",
            JokerId::RaisedFist => "Raised Fist",
            JokerId::ChaosTheClown => "Chaos the Clown",
            JokerId::ScaryFace => "Scary Face",
            JokerId::AbstractJoker => "Abstract Joker",
            JokerId::DelayedGratification => "Delayed Gratification",
            JokerId::GrosMichel => "Gros Michel",
            JokerId::EvenSteven => "Even Steven",
            JokerId::OddTodd => "Odd Todd",
            JokerId::Scholar => "Scholar",
            JokerId::BusinessCard => "Business Card",
            JokerId::Supernova => "Supernova",
            JokerId::RideTheBus => "Ride the Bus",
            JokerId::Egg => "Egg",
            JokerId::Runner => "Runner",
            JokerId::IceCream => "Ice Cream",
            JokerId::Splash => "Splash",
            JokerId::BlueJoker => "Blue Joker",
            JokerId::FacelessJoker => "Faceless Joker",
            JokerId::GreenJoker => "Green Joker",
            JokerId::Superposition => "Superposition",
            JokerId::ToDoList => "To Do List",
            JokerId::Cavendish => "Cavendish",
            JokerId::RedCard => "Red Card",
            JokerId::SquareJoker => "Square Joker",
            JokerId::RiffRaff => "Riff-Raff",
            JokerId::Photograph => "Photograph",
            JokerId::MailInRebate => "Mail-In Rebate",
            JokerId::Hallucination => "Hallucination",
            JokerId::FortuneTeller => "Fortune Teller",
            JokerId::Juggler => "Juggler",
            JokerId::Drunkard => "Drunkard",
            JokerId::GoldenJoker => "Golden Joker",
            JokerId::Popcorn => "Popcorn",
            JokerId::WalkieTalkie => "Walkie Talkie",
            JokerId::SmileyFace => "Smiley Face",
            JokerId::GoldenTicket => "Golden Ticket",
            JokerId::Swashbuckler => "Swashbuckler",
            JokerId::HangingChad => "Hanging Chad",
            JokerId::ShootTheMoon => "Shoot the Moon",
            JokerId::JokerStencil => "Joker Stencil",
            JokerId::FourFingers => "Four Fingers",
            JokerId::Mime => "Mime",
            JokerId::CeremonialDagger => "Ceremonial Dagger",
            JokerId::MarbleJoker => "Marble Joker",
            JokerId::LoyaltyCard => "Loyalty Card",
            JokerId::Dusk => "Dusk",
            JokerId::Fibonacci => "Fibonacci",
            JokerId::SteelJoker => "Steel Joker",
            JokerId::Hack => "Hack",
            JokerId::Pareidolia => "Pareidolia",
            JokerId::SpaceJoker => "Space Joker",
            JokerId::Burglar => "Burglar",
            JokerId::Blackboard => "Blackboard",
            JokerId::SixthSense => "Sixth Sense",
            JokerId::Constellation => "Constellation",
            JokerId::Hiker => "Hiker",
            JokerId::CardSharp => "Card Sharp",
            JokerId::Madness => "Madness",
            JokerId::Seance => "Seance",
            JokerId::Shortcut => "Shortcut",
            JokerId::Hologram => "Hologram",
            JokerId::CloudNine => "Cloud 9",
            JokerId::Rocket => "Rocket",
            JokerId::MidasMask => "Midas Mask",
            JokerId::Luchador => "Luchador",
            JokerId::GiftCard => "Gift Card",
            JokerId::TurtleBean => "Turtle Bean",
            JokerId::Erosion => "Erosion",
            JokerId::ReservedParking => "Reserved Parking",
            JokerId::ToTheMoon => "To the Moon",
            JokerId::StoneJoker => "Stone Joker",
            JokerId::LuckyCat => "Lucky Cat",
            JokerId::Bull => "Bull",
            JokerId::DietCola => "Diet Cola",
            JokerId::TradingCard => "Trading Card",
            JokerId::FlashCard => "Flash Card",
            JokerId::SpareTrousers => "Spare Trousers",
            JokerId::Ramen => "Ramen",
            JokerId::Seltzer => "Seltzer",
            JokerId::Castle => "Castle",
            JokerId::MrBones => "Mr. Bones",
            JokerId::Acrobat => "Acrobat",
            JokerId::SockAndBuskin => "Sock and Buskin",
            JokerId::Troubadour => "Troubadour",
            JokerId::Certificate => "Certificate",
            JokerId::SmearedJoker => "Smeared Joker",
            JokerId::Throwback => "Throwback",
            JokerId::RoughGem => "Rough Gem",
            JokerId::Bloodstone => "Bloodstone",
            JokerId::Arrowhead => "Arrowhead",
            JokerId::OnyxAgate => "Onyx Agate",
            JokerId::GlassJoker => "Glass Joker",
            JokerId::Showman => "Showman",
            JokerId::FlowerPot => "Flower Pot",
            JokerId::MerryAndy => "Merry Andy",
            JokerId::OopsAllSixes => "Oops! All 6s",
            JokerId::TheIdol => "The Idol",
            JokerId::SeeingDouble => "Seeing Double",
            JokerId::Matador => "Matador",
            JokerId::Satellite => "Satellite",
            JokerId::Cartomancer => "Cartomancer",
            JokerId::Astronomer => "Astronomer",
            JokerId::BurntJoker => "Burnt Joker",
            JokerId::Bootstraps => "Bootstraps",
            JokerId::Dna => "DNA",
            JokerId::Vampire => "Vampire",
            JokerId::Vagabond => "Vagabond",
            JokerId::Baron => "Baron",
            JokerId::Obelisk => "Obelisk",
            JokerId::BaseballCard => "Baseball Card",
            JokerId::AncientJoker => "Ancient Joker",
            JokerId::Campfire => "Campfire",
            JokerId::Blueprint => "Blueprint",
            JokerId::WeeJoker => "Wee Joker",
            JokerId::HitTheRoad => "Hit the Road",
            JokerId::TheDuo => "The Duo",
            JokerId::TheTrio => "The Trio",
            JokerId::TheFamily => "The Family",
            JokerId::TheOrder => "The Order",
            JokerId::TheTribe => "The Tribe",
            JokerId::Stuntman => "Stuntman",
            JokerId::InvisibleJoker => "Invisible Joker",
            JokerId::Brainstorm => "Brainstorm",
            JokerId::DriversLicense => "Driver's License",
            JokerId::Canio => "Canio",
            JokerId::Triboulet => "Triboulet",
            JokerId::Yorick => "Yorick",
            JokerId::Chicot => "Chicot",
            JokerId::Perkeo => "Perkeo",
        }
    }

    /// 由名稱解析（大小寫、空白、連字號不敏感）
    pub fn from_name(name: &str) -> Option<JokerId> {
        let wanted = normalize(name);
        (0..JOKER_COUNT)
            .map(|i| JokerId::from_index(i).unwrap())
            .find(|j| normalize(j.name()) == wanted)
    }
}

/// 名稱比對用的正規化：小寫、去掉非字母數字
pub fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

// ============================================================================
// 貼紙與生成結果
// ============================================================================

/// Joker 貼紙旗標（Eternal / Perishable / Rental）
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stickers(u8);

impl Stickers {
    pub const ETERNAL: Stickers = Stickers(1);
    pub const PERISHABLE: Stickers = Stickers(2);
    pub const RENTAL: Stickers = Stickers(4);

    pub fn none() -> Self {
        Stickers(0)
    }

    pub fn with(self, other: Stickers) -> Self {
        Stickers(self.0 | other.0)
    }

    pub fn contains(self, other: Stickers) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn from_name(name: &str) -> Option<Stickers> {
        match normalize(name).as_str() {
            "eternal" => Some(Self::ETERNAL),
            "perishable" => Some(Self::PERISHABLE),
            "rental" => Some(Self::RENTAL),
            _ => None,
        }
    }
}

/// 生成出來的一張 Joker（流的輸出單位）
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JokerItem {
    pub id: JokerId,
    pub edition: Edition,
    pub stickers: Stickers,
}

impl JokerItem {
    pub fn plain(id: JokerId) -> Self {
        Self {
            id,
            edition: Edition::None,
            stickers: Stickers::none(),
        }
    }
}

// ============================================================================
// 單元測試
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rarity_bands() {
        assert_eq!(
            COMMON_COUNT + UNCOMMON_COUNT + RARE_COUNT + LEGENDARY_COUNT,
            JOKER_COUNT
        );
        assert_eq!(JokerId::Joker.rarity(), Rarity::Common);
        assert_eq!(JokerId::JokerStencil.rarity(), Rarity::Uncommon);
        assert_eq!(JokerId::Blueprint.rarity(), Rarity::Rare);
        assert_eq!(JokerId::Perkeo.rarity(), Rarity::Legendary);
    }

    #[test]
    fn test_index_round_trip() {
        for i in 0..JOKER_COUNT {
            let j = JokerId::from_index(i).unwrap();
            assert_eq!(j.to_index(), i);
        }
        assert!(JokerId::from_index(JOKER_COUNT).is_none());
    }

    #[test]
    fn test_pool_contract() {
        assert_eq!(JokerId::pool(Rarity::Legendary).len(), 5);
        assert_eq!(JokerId::from_pool_index(Rarity::Legendary, 4), JokerId::Perkeo);
        assert_eq!(JokerId::from_pool_index(Rarity::Rare, 0), JokerId::Dna);
        for r in [Rarity::Common, Rarity::Uncommon, Rarity::Rare, Rarity::Legendary] {
            for (i, j) in JokerId::pool(r).enumerate() {
                assert_eq!(j.rarity(), r);
                assert_eq!(JokerId::from_pool_index(r, i), j);
            }
        }
    }

    #[test]
    fn test_from_name() {
        assert_eq!(JokerId::from_name("Blueprint"), Some(JokerId::Blueprint));
        assert_eq!(JokerId::from_name("riff-raff"), Some(JokerId::RiffRaff));
        assert_eq!(JokerId::from_name("Oops! All 6s"), Some(JokerId::OopsAllSixes));
        assert_eq!(JokerId::from_name("DRIVERS LICENSE"), Some(JokerId::DriversLicense));
        assert_eq!(JokerId::from_name("NotAJoker"), None);
    }

    #[test]
    fn test_stickers() {
        let s = Stickers::none().with(Stickers::ETERNAL).with(Stickers::RENTAL);
        assert!(s.contains(Stickers::ETERNAL));
        assert!(s.contains(Stickers::RENTAL));
        assert!(!s.contains(Stickers::PERISHABLE));
        assert_eq!(Stickers::from_name("perishable"), Some(Stickers::PERISHABLE));
    }
}
