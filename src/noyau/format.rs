// src/noyau/format.rs
//
// Rendu canonique d’un f64 pour l’affichage :
// - notation fixe, au plus `chiffres` décimales, zéros de fin rognés
// - "-0" affiché "0"
// - notation scientifique pour les très grands / très petits modules

/// Plafond par défaut des décimales affichées.
pub const CHIFFRES_FRACTION_DEFAUT: usize = 10;

/// Garde-fou : au-delà, f64 n’a plus de chiffres significatifs à montrer.
pub const CHIFFRES_FRACTION_MAX: usize = 15;

/// À partir de ce module, la notation fixe devient illisible.
const SEUIL_SCIENTIFIQUE: f64 = 1e16;

/// Rendu avec un plafond explicite de décimales.
pub fn format_nombre_avec(v: f64, chiffres: usize) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "∞" } else { "-∞" }.to_string();
    }

    let chiffres = chiffres.min(CHIFFRES_FRACTION_MAX);
    let a = v.abs();

    // plus petit pas représentable en notation fixe : 10^-chiffres
    let trop_petit = chiffres > 0 && a != 0.0 && a < 10f64.powi(-(chiffres as i32));
    if a >= SEUIL_SCIENTIFIQUE || trop_petit {
        return format_scientifique(v, chiffres.max(1));
    }

    let s = rogner_zeros(format!("{v:.chiffres$}"));
    if s == "-0" {
        "0".to_string()
    } else {
        s
    }
}

/// 1.5e20, -2.25e-12 : mantisse rognée comme en notation fixe.
fn format_scientifique(v: f64, chiffres: usize) -> String {
    let brut = format!("{v:.chiffres$e}");
    match brut.split_once('e') {
        Some((mantisse, exposant)) => format!("{}e{exposant}", rogner_zeros(mantisse.to_string())),
        None => brut,
    }
}

fn rogner_zeros(s: String) -> String {
    if !s.contains('.') {
        return s;
    }
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}
