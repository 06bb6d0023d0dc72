//! Tests scientifiques (campagne) : propriétés observables du noyau,
//! pilotées comme un utilisateur, touche par touche.
//!
//! - précédence × ÷ avant + −, gauche à droite
//! - parenthèses, division par zéro, domaines des fonctions
//! - historique : ordre épinglé, aller-retour du blob, échecs sans trace
//! - enchaînement : le résultat amorce le calcul suivant

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{TimeZone, Utc};

use super::erreur::{ErreurCalc, ErreurStockage};
use super::historique::{decoder, JournalHistorique, StockageCle, StockageMemoire, CLE_HISTORIQUE};
use super::jetons::{Cote, Operateur, Tok};
use super::reglages::Reglages;
use super::saisie::{Action, Controleur, Fonction};

/// Magasin partagé entre le test et le contrôleur.
#[derive(Clone, Default)]
struct Magasin(Rc<RefCell<StockageMemoire>>);

impl StockageCle for Magasin {
    fn charger(&self, cle: &str) -> Option<Vec<u8>> {
        self.0.borrow().charger(cle)
    }
    fn sauver(&mut self, cle: &str, blob: &[u8]) -> Result<(), ErreurStockage> {
        self.0.borrow_mut().sauver(cle, blob)
    }
}

fn ctrl() -> Controleur {
    Controleur::new(Reglages::default(), Box::new(StockageMemoire::new()))
}

/// Touches façon clavier de calculatrice : "2 + 3 × 4 =".
fn touche(t: &str) -> Action {
    match t {
        "+" => Action::Operateur(Operateur::Plus),
        "−" => Action::Operateur(Operateur::Moins),
        "×" => Action::Operateur(Operateur::Fois),
        "÷" => Action::Operateur(Operateur::Divise),
        "(" => Action::Parenthese(Cote::Gauche),
        ")" => Action::Parenthese(Cote::Droite),
        "=" => Action::Egal,
        "±" => Action::ChangerSigne,
        "%" => Action::Pourcent,
        "√" => Action::Fonction(Fonction::Racine),
        "." => Action::Point,
        _ => panic!("touche inconnue {t:?}"),
    }
}

/// Joue une séquence séparée par des espaces ; les nombres sont tapés chiffre à chiffre.
/// Retourne le résultat de la dernière action.
fn joue(c: &mut Controleur, sequence: &str) -> Result<(), ErreurCalc> {
    let mut dernier = Ok(());
    for mot in sequence.split_whitespace() {
        if mot.chars().all(|ch| ch.is_ascii_digit() || ch == '.') {
            for ch in mot.chars() {
                let a = if ch == '.' { Action::Point } else { Action::Chiffre(ch) };
                dernier = c.handle(a);
            }
        } else {
            dernier = c.handle(touche(mot));
        }
    }
    dernier
}

fn resultat(sequence: &str) -> Result<f64, ErreurCalc> {
    let mut c = ctrl();
    joue(&mut c, sequence)?;
    c.evaluate()
}

/* ------------------------ Précédence ------------------------ */

#[test]
fn sci_precedence_sans_parentheses() {
    assert_eq!(resultat("2 + 3 × 4"), Ok(14.0));
    assert_eq!(resultat("10 ÷ 2 − 3"), Ok(2.0));
    assert_eq!(resultat("2 × 3 + 4 × 5"), Ok(26.0));
    assert_eq!(resultat("100 ÷ 10 ÷ 5"), Ok(2.0));
    assert_eq!(resultat("1 − 2 − 3"), Ok(-4.0));
}

#[test]
fn sci_decimales() {
    let v = resultat("0.1 + 0.2").unwrap();
    assert!((v - 0.3).abs() < 1e-12);

    let mut c = ctrl();
    joue(&mut c, "0.1 + 0.2 =").unwrap();
    assert_eq!(c.etat().texte_affichage, "0.3");
}

/* ------------------------ Parenthèses ------------------------ */

#[test]
fn sci_parentheses() {
    assert_eq!(resultat("( 2 + 3 ) × 4"), Ok(20.0));
    assert_eq!(resultat("2 × ( 3 + ( 4 − 1 ) × 2 )"), Ok(18.0));
    assert_eq!(resultat("( 2 + 3"), Err(ErreurCalc::UnbalancedParentheses));
}

#[test]
fn sci_parenthese_vide() {
    let mut c = ctrl();
    joue(&mut c, "(").unwrap();
    // ")" juste après "(" : jetons non vides, donc acceptée ; l’évaluation refuse
    joue(&mut c, ")").unwrap();
    assert_eq!(c.evaluate(), Err(ErreurCalc::NoOperand));
}

/* ------------------------ Erreurs ------------------------ */

#[test]
fn sci_division_par_zero() {
    assert_eq!(resultat("5 ÷ 0"), Err(ErreurCalc::DivisionByZero));
    assert_eq!(resultat("1 + 5 ÷ ( 2 − 2 )"), Err(ErreurCalc::DivisionByZero));
}

#[test]
fn sci_operateur_de_tete_et_de_fin() {
    let mut c = ctrl();
    assert_eq!(joue(&mut c, "+"), Err(ErreurCalc::MissingOperand));
    assert_eq!(c.evaluate(), Err(ErreurCalc::MissingOperand));

    // "( + 3 )" passe la saisie mais pas la grammaire
    let mut c = ctrl();
    joue(&mut c, "( + 3 )").unwrap();
    assert_eq!(c.evaluate(), Err(ErreurCalc::MalformedExpression));

    // "3 +" : opérateur final
    let mut c = ctrl();
    joue(&mut c, "3 +").unwrap();
    assert_eq!(c.evaluate(), Err(ErreurCalc::TrailingOperator));
    assert!(c.historique().is_empty());
    // le flux n’est pas perdu : on complète et on relance
    joue(&mut c, "4").unwrap();
    assert_eq!(c.evaluate(), Ok(7.0));
}

#[test]
fn sci_operateur_de_tete_dans_le_flux() {
    // "+ 3" n’est pas constructible au clavier ; l’évaluateur le refuse quand même
    use super::eval::evaluer;
    assert_eq!(
        evaluer(&[Tok::Op(Operateur::Plus), Tok::Num(3.0)]),
        Err(ErreurCalc::LeadingOperator)
    );
    assert_eq!(
        evaluer(&[Tok::Num(3.0), Tok::Op(Operateur::Plus)]),
        Err(ErreurCalc::TrailingOperator)
    );
}

#[test]
fn sci_echec_sans_effet_sur_l_historique() {
    let mut c = ctrl();
    joue(&mut c, "5 ÷ 0").unwrap();
    assert_eq!(c.evaluate(), Err(ErreurCalc::DivisionByZero));
    assert!(c.historique().is_empty());
    assert_eq!(c.etat().message_erreur.as_deref(), Some("division par zéro"));
    assert_eq!(c.etat().texte_equation, "5 ÷ 0");
}

/* ------------------------ Signe / pourcent / fonctions ------------------------ */

#[test]
fn sci_double_changement_de_signe() {
    for x in ["7", "0.25", "12.50", "0"] {
        let mut c = ctrl();
        joue(&mut c, x).unwrap();
        let avant = c.etat().texte_affichage;
        joue(&mut c, "± ±").unwrap();
        assert_eq!(c.etat().texte_affichage, avant, "x={x}");
    }

    // même chose sur un résultat engagé
    let mut c = ctrl();
    joue(&mut c, "6 × 7 =").unwrap();
    joue(&mut c, "± ±").unwrap();
    assert_eq!(c.evaluate(), Ok(42.0));

    // résultat non entier : la valeur revient au bit près, pas seulement son rendu
    let mut c = ctrl();
    joue(&mut c, "1 ÷ 3 =").unwrap();
    joue(&mut c, "±").unwrap();
    assert_eq!(c.flux().valeur_tampon(), Ok(Some(-1.0 / 3.0)));
    joue(&mut c, "±").unwrap();
    assert_eq!(c.evaluate(), Ok(1.0 / 3.0));

    // idem sur une valeur produite par une fonction
    let mut c = ctrl();
    joue(&mut c, "2 √ ± ±").unwrap();
    assert_eq!(c.evaluate(), Ok(2.0_f64.sqrt()));
}

#[test]
fn sci_fonctions_domaine() {
    let mut c = ctrl();
    joue(&mut c, "4 √").unwrap();
    assert_eq!(c.etat().texte_affichage, "2");

    let mut c = ctrl();
    joue(&mut c, "1 ±").unwrap();
    assert_eq!(joue(&mut c, "√"), Err(ErreurCalc::InvalidFunctionInput));
    assert_eq!(c.etat().texte_affichage, "-1");

    for (f, x) in [
        (Fonction::Inverse, 0.0),
        (Fonction::Ln, 0.0),
        (Fonction::Log10, -1.0),
    ] {
        assert_eq!(
            f.appliquer(x, Default::default()),
            Err(ErreurCalc::InvalidFunctionInput),
            "{f:?}({x})"
        );
    }
}

#[test]
fn sci_pourcent_dans_une_expression() {
    // 200 + 10 % => 200 + 0.1
    assert_eq!(resultat("200 + 10 %"), Ok(200.1));
}

/* ------------------------ Enchaînement ------------------------ */

#[test]
fn sci_enchainement() {
    let mut c = ctrl();
    joue(&mut c, "2 + 3 =").unwrap();
    assert_eq!(c.etat().texte_affichage, "5");
    joue(&mut c, "× 4 =").unwrap();
    assert_eq!(c.etat().texte_affichage, "20");

    let h = c.etat().entrees_historique;
    assert_eq!(h.len(), 2);
    assert_eq!(h[0].expression, "5 × 4");
    assert_eq!(h[1].expression, "2 + 3");
}

/* ------------------------ Historique ------------------------ */

#[test]
fn sci_historique_epingle_d_abord() {
    let mut j = JournalHistorique::ouvrir(Box::new(StockageMemoire::new()), 100);
    let e1 = j.record_a("E1", 1.0, Utc.timestamp_opt(1, 0).unwrap());
    let e2 = j.record_a("E2", 2.0, Utc.timestamp_opt(2, 0).unwrap());
    j.toggle_pin(e1);
    let ids: Vec<u64> = j.entrees().iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![e1, e2]);
}

#[test]
fn sci_historique_aller_retour() {
    let m = Magasin::default();
    {
        let mut c = Controleur::new(Reglages::default(), Box::new(m.clone()));
        joue(&mut c, "2 + 3 =").unwrap();
        joue(&mut c, "× 4 =").unwrap();
        let id = c.historique()[1].id;
        assert!(c.toggle_pin(id));
    }

    let blob = m.0.borrow().charger(CLE_HISTORIQUE).unwrap();
    let mut relues = decoder(&blob).unwrap();
    relues.sort_by_key(|e| e.id);
    assert_eq!(relues.len(), 2);
    assert_eq!(relues[0].expression, "2 + 3");
    assert_eq!(relues[0].resultat, 5.0);
    assert!(relues[0].epingle);
    assert_eq!(relues[1].resultat, 20.0);

    // redémarrage : même contenu, même ordre
    let c = Controleur::new(Reglages::default(), Box::new(m.clone()));
    let exprs: Vec<&str> = c.historique().iter().map(|e| e.expression.as_str()).collect();
    assert_eq!(exprs, vec!["2 + 3", "5 × 4"]);
}

#[test]
fn sci_historique_suppression_et_reutilisation() {
    let mut c = ctrl();
    joue(&mut c, "9 × 9 =").unwrap();
    joue(&mut c, "1 + 1 =").unwrap();
    let ancien = c.historique()[1].id;

    joue(&mut c, "(").unwrap();
    assert_eq!(c.reuse_history_entry(ancien), Some(81.0));
    joue(&mut c, "− 1 ) ÷ 8").unwrap();
    assert_eq!(c.evaluate(), Ok(10.0));

    assert_eq!(c.delete_history(&[ancien]), 1);
    assert!(c.historique().iter().all(|e| e.id != ancien));
}

#[test]
fn sci_panne_de_persistance_invisible() {
    let m = Magasin::default();
    m.0.borrow_mut().en_panne = true;
    {
        let mut c = Controleur::new(Reglages::default(), Box::new(m.clone()));
        joue(&mut c, "1 + 1 =").unwrap();
        assert_eq!(c.etat().message_erreur, None);
        assert_eq!(c.historique().len(), 1);
        m.0.borrow_mut().en_panne = false;
        // fermeture : vidage final
    }
    assert!(m.0.borrow().charger(CLE_HISTORIQUE).is_some());
}
