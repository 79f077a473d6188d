use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KnowledgeKind {
    /// "What is X" style explanations.
    Definition,
    /// Curated research-paper pointers.
    Research,
}

/// One curated catalog entry.
///
/// The catalog is the only content this adapter serves; topics outside it
/// yield an explicit empty outcome rather than synthesized text.
#[derive(Debug, Clone, Copy)]
pub struct KnowledgeEntry {
    pub topic: &'static str,
    pub aliases: &'static [&'static str],
    pub kind: KnowledgeKind,
    pub summary: &'static str,
    pub details: &'static str,
    pub confidence: u8,
}

pub const DEFINITION_ENTRIES: &[KnowledgeEntry] = &[
    KnowledgeEntry {
        topic: "blockchain",
        aliases: &["blockchain", "block chain"],
        kind: KnowledgeKind::Definition,
        summary: "Blockchain is a distributed ledger technology that records transactions across multiple computers in a way that cannot be altered retroactively",
        details: "Key characteristics: decentralization, immutability, transparency, consensus mechanisms (PoW/PoS), cryptographic security, peer-to-peer networking. Applications: cryptocurrencies, smart contracts, supply chain tracking, digital identity, DeFi, NFTs",
        confidence: 98,
    },
    KnowledgeEntry {
        topic: "artificial intelligence",
        aliases: &["artificial intelligence", "ai", "machine learning"],
        kind: KnowledgeKind::Definition,
        summary: "Artificial Intelligence (AI) is the simulation of human intelligence by machines, enabling them to learn, reason, and self-correct",
        details: "Major fields: Machine Learning, Deep Learning, Natural Language Processing, Computer Vision, Robotics, Expert Systems",
        confidence: 98,
    },
    KnowledgeEntry {
        topic: "defi",
        aliases: &["defi", "decentralized finance"],
        kind: KnowledgeKind::Definition,
        summary: "DeFi refers to financial services built from smart contracts on blockchains, eliminating intermediaries like banks and brokers",
        details: "Major protocols: Uniswap (DEX), Aave (lending), Compound (borrowing), MakerDAO (stablecoins), Curve (stablecoin swaps)",
        confidence: 97,
    },
    KnowledgeEntry {
        topic: "nft",
        aliases: &["nft", "non fungible token"],
        kind: KnowledgeKind::Definition,
        summary: "NFTs are unique digital assets on a blockchain representing ownership of digital or physical items, each with distinct properties",
        details: "Applications: digital art, gaming items, collectibles, music rights, real estate, identity verification, event tickets",
        confidence: 97,
    },
    KnowledgeEntry {
        topic: "solana",
        aliases: &["solana", "sol"],
        kind: KnowledgeKind::Definition,
        summary: "Solana is a high-performance blockchain supporting tens of thousands of transactions per second with sub-second finality using Proof of History consensus",
        details: "Features: parallel transaction processing, 400ms block times, low fees, smart contracts written in Rust",
        confidence: 98,
    },
    KnowledgeEntry {
        topic: "nosana",
        aliases: &["nosana", "nos"],
        kind: KnowledgeKind::Definition,
        summary: "Nosana is a decentralized GPU compute marketplace built on Solana, enabling AI developers to access distributed computing power",
        details: "Provides GPU nodes for AI inference, a distributed computing network, and the NOS token for governance and payments",
        confidence: 98,
    },
    KnowledgeEntry {
        topic: "bitcoin",
        aliases: &["bitcoin", "btc"],
        kind: KnowledgeKind::Definition,
        summary: "Bitcoin is the first decentralized cryptocurrency, a peer-to-peer electronic cash system secured by proof-of-work mining",
        details: "Fixed supply of 21 million coins, ten-minute block times, and the largest network effect of any cryptocurrency",
        confidence: 98,
    },
    KnowledgeEntry {
        topic: "ethereum",
        aliases: &["ethereum", "eth"],
        kind: KnowledgeKind::Definition,
        summary: "Ethereum is a programmable blockchain that introduced smart contracts, powering most DeFi and NFT activity",
        details: "Proof-of-stake consensus since the Merge, the EVM execution environment, and the largest smart-contract developer ecosystem",
        confidence: 98,
    },
];

pub const RESEARCH_ENTRIES: &[KnowledgeEntry] = &[
    KnowledgeEntry {
        topic: "ai research",
        aliases: &["ai", "artificial intelligence", "machine learning", "ml", "deep learning", "llm"],
        kind: KnowledgeKind::Research,
        summary: "Recent AI literature is indexed on arXiv cs.AI and cs.LG; key threads cover scaling laws, alignment via AI feedback, and transformer architecture optimizations",
        details: "Starting points: arXiv cs.AI listings, Papers with Code leaderboards, and the major lab research blogs",
        confidence: 92,
    },
    KnowledgeEntry {
        topic: "general research",
        aliases: &[],
        kind: KnowledgeKind::Research,
        summary: "Peer-reviewed literature for most fields is indexed on arXiv, Google Scholar, and PubMed",
        details: "Search those indexes with the topic keywords for current publications",
        confidence: 85,
    },
];
