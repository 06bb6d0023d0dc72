//! Taxonomie des erreurs du noyau.
//!
//! Toutes sont récupérables : l’utilisateur corrige et recommence.
//! Le texte `Display` est le message transitoire affiché par la vue.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ErreurCalc {
    /// Opérateur, "=", ")" ou fonction sans nombre disponible.
    #[error("opérande manquant")]
    MissingOperand,

    /// Le tampon de saisie ne se lit pas comme un nombre.
    #[error("nombre invalide: {0:?}")]
    InvalidNumberFormat(String),

    /// ")" demandée alors qu’aucune "(" n’est ouverte.
    #[error("aucune parenthèse ouverte")]
    UnmatchedParenthesis,

    /// ")" orpheline ou "(" non refermée à l’évaluation.
    #[error("parenthèses non équilibrées")]
    UnbalancedParentheses,

    #[error("l’expression commence par un opérateur")]
    LeadingOperator,

    #[error("l’expression se termine par un opérateur")]
    TrailingOperator,

    /// Enchaînement invalide (deux opérateurs, deux nombres, "()"...).
    #[error("expression mal formée")]
    MalformedExpression,

    #[error("aucun nombre à évaluer")]
    NoOperand,

    #[error("division par zéro")]
    DivisionByZero,

    #[error("résultat non fini")]
    NonFiniteResult,

    /// Domaine d’une fonction unaire violé (√ négatif, 1/0, ln 0...).
    #[error("entrée invalide pour la fonction")]
    InvalidFunctionInput,
}

/// Erreurs du collaborateur de persistance : journalisées, jamais affichées.
#[derive(Debug, Error)]
pub enum ErreurStockage {
    #[error("E/S: {0}")]
    Io(#[from] std::io::Error),

    #[error("sérialisation: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("stockage indisponible")]
    Indisponible,
}
