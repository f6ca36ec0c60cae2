//! The embedded research catalog.
//!
//! Every round shares the same Big Job / Little Job / Outcome tree. Ratings
//! per round come from a baseline, shifted by the round's delta, with exact
//! overrides for the two earliest rounds.

use std::collections::HashMap;
use std::sync::OnceLock;

use chrono::NaiveDate;

use super::types::{BigJob, JtbdData, LittleJob, Outcome, ResearchRound};
use super::DatasetError;

const MIN_RATING: f64 = 6.0;
const MAX_RATING: f64 = 9.7;

struct OutcomeSeed {
    id: &'static str,
    name: &'static str,
    description: &'static str,
}

struct LittleJobSeed {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    outcomes: &'static [OutcomeSeed],
}

struct BigJobSeed {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    little_jobs: &'static [LittleJobSeed],
}

struct RoundMeta {
    id: &'static str,
    name: &'static str,
    date: &'static str,
    description: &'static str,
}

/// (outcome id, importance, satisfaction)
type Rating = (&'static str, f64, f64);

const BASE_JOBS: &[BigJobSeed] = &[
    BigJobSeed {
        id: "multicanal",
        name: "Gerir operação multicanal",
        description: "Gerenciar vendas e operações em múltiplos marketplaces simultaneamente",
        little_jobs: &[
            LittleJobSeed {
                id: "preparar-listagem",
                name: "Preparar produtos para listagem",
                description: "Preparar informações e dados dos produtos para publicação nos marketplaces",
                outcomes: &[
                    OutcomeSeed {
                        id: "tempo-atributos",
                        name: "Reduzir tempo de preencher atributos obrigatórios",
                        description: "Minimizar o tempo necessário para preencher campos obrigatórios dos produtos",
                    },
                    OutcomeSeed {
                        id: "taxa-aprovacao",
                        name: "Aumentar taxa de aprovação de anúncios",
                        description: "Melhorar a taxa de anúncios aprovados na primeira tentativa",
                    },
                    OutcomeSeed {
                        id: "visibilidade-busca",
                        name: "Melhorar visibilidade em buscas do marketplace",
                        description: "Otimizar anúncios para aparecer melhor nas buscas dos compradores",
                    },
                ],
            },
            LittleJobSeed {
                id: "controlar-estoque",
                name: "Controlar estoque",
                description: "Gerenciar disponibilidade e quantidade de produtos",
                outcomes: &[
                    OutcomeSeed {
                        id: "evitar-ruptura",
                        name: "Evitar ruptura de estoque",
                        description: "Prevenir falta de produtos em estoque",
                    },
                    OutcomeSeed {
                        id: "sincronizar-multiplos",
                        name: "Sincronizar estoque entre múltiplos canais",
                        description: "Manter estoque atualizado em todos os marketplaces simultaneamente",
                    },
                ],
            },
        ],
    },
    BigJobSeed {
        id: "aumentar-vendas",
        name: "Aumentar vendas",
        description: "Maximizar receita e volume de vendas nos marketplaces",
        little_jobs: &[LittleJobSeed {
            id: "precificar-produtos",
            name: "Precificar produtos",
            description: "Definir preços competitivos e rentáveis",
            outcomes: &[
                OutcomeSeed {
                    id: "competitividade-preco",
                    name: "Manter competitividade de preços",
                    description: "Garantir que os preços sejam competitivos no mercado",
                },
                OutcomeSeed {
                    id: "monitorar-concorrentes",
                    name: "Monitorar preços dos concorrentes",
                    description: "Acompanhar em tempo real os preços da concorrência",
                },
            ],
        }],
    },
    BigJobSeed {
        id: "logistica-fulfillment",
        name: "Otimizar logística e fulfillment",
        description: "Equilibrar custo, prazo, SLA e preparo de pedidos",
        little_jobs: &[
            LittleJobSeed {
                id: "roteirizar-despacho",
                name: "Roteirizar despacho",
                description: "Selecionar transportadora/serviço ideal por CEP, peso e SLA",
                outcomes: &[
                    OutcomeSeed {
                        id: "custo-frete",
                        name: "Reduzir custo médio de frete",
                        description: "Escolher automaticamente a opção de menor custo",
                    },
                    OutcomeSeed {
                        id: "prazo-entrega",
                        name: "Melhorar prazo médio de entrega",
                        description: "Minimizar tempo de trânsito mantendo custo",
                    },
                ],
            },
            LittleJobSeed {
                id: "preparar-fulfillment",
                name: "Preparar para fulfillment (FBA/FBM/3PL)",
                description: "Planejar envios a centros e regras por canal",
                outcomes: &[
                    OutcomeSeed {
                        id: "rate-ocorrencias",
                        name: "Reduzir ocorrências logísticas",
                        description: "Diminuir extravios, avarias e devoluções por erro",
                    },
                    OutcomeSeed {
                        id: "tempo-picking",
                        name: "Reduzir tempo de picking e packing",
                        description: "Otimizar separação e embalagem por pedido",
                    },
                ],
            },
        ],
    },
    BigJobSeed {
        id: "planejar-estoque",
        name: "Planejar e reabastecer estoque",
        description: "Prever demanda e repor com eficiência por SKU/canal",
        little_jobs: &[
            LittleJobSeed {
                id: "previsao-compra",
                name: "Prever necessidade de compra",
                description: "Sinalizar rupturas futuras por SKU/canal",
                outcomes: &[
                    OutcomeSeed {
                        id: "acuracia-previsao",
                        name: "Aumentar acurácia da previsão",
                        description: "Melhorar MAPE e reduzir excesso/ruptura",
                    },
                    OutcomeSeed {
                        id: "leadtime-fornecedor",
                        name: "Considerar lead time de fornecedor",
                        description: "Planejamento alinhado a prazos reais",
                    },
                ],
            },
            LittleJobSeed {
                id: "balancear-estoque",
                name: "Balancear estoque entre canais",
                description: "Redistribuir conforme demanda e margem",
                outcomes: &[
                    OutcomeSeed {
                        id: "saldo-multicanal",
                        name: "Balancear saldo multicanal",
                        description: "Evitar excesso num canal e ruptura em outro",
                    },
                    OutcomeSeed {
                        id: "priorizar-skus",
                        name: "Priorizar SKUs críticos",
                        description: "Focar top sellers e linhas com maior contribuição",
                    },
                ],
            },
        ],
    },
    BigJobSeed {
        id: "pos-venda-reputacao",
        name: "Operar pós-venda e reputação",
        description: "Gerenciar SAC, devoluções e reviews",
        little_jobs: &[
            LittleJobSeed {
                id: "tratar-reclamacoes",
                name: "Tratar reclamações rapidamente",
                description: "Consolidar tickets e SLA por canal",
                outcomes: &[
                    OutcomeSeed {
                        id: "tempo-primeira-resposta",
                        name: "Reduzir tempo de primeira resposta",
                        description: "Responder compradores com mais agilidade",
                    },
                    OutcomeSeed {
                        id: "taxa-reabertura",
                        name: "Diminuir reabertura de chamados",
                        description: "Resolver na primeira interação",
                    },
                ],
            },
            LittleJobSeed {
                id: "reviews",
                name: "Gerenciar avaliações e reputação",
                description: "Solicitar, moderar e responder reviews",
                outcomes: &[
                    OutcomeSeed {
                        id: "nps",
                        name: "Aumentar NPS pós-entrega",
                        description: "Mensagens e fluxos personalizados",
                    },
                    OutcomeSeed {
                        id: "volume-nota-reviews",
                        name: "Aumentar volume e nota de reviews",
                        description: "Elevar prova social e SEO no canal",
                    },
                ],
            },
        ],
    },
    BigJobSeed {
        id: "financeiro-repasses",
        name: "Gestão financeira e repasses",
        description: "Controlar receitas, taxas, impostos e margem líquida",
        little_jobs: &[
            LittleJobSeed {
                id: "conciliacao",
                name: "Conciliar repasses e taxas",
                description: "Conferir repasses dos canais e taxas aplicadas",
                outcomes: &[
                    OutcomeSeed {
                        id: "tempo-conciliacao",
                        name: "Reduzir tempo de conciliação",
                        description: "Automatizar baixas e divergências",
                    },
                    OutcomeSeed {
                        id: "lucro-por-pedido",
                        name: "Aumentar visibilidade do lucro por pedido",
                        description: "Ver margem líquida por SKU/canal",
                    },
                ],
            },
            LittleJobSeed {
                id: "precificacao-unitaria",
                name: "Aprimorar precificação unitária",
                description: "Incorporar impostos, comissões e custos ocultos",
                outcomes: &[
                    OutcomeSeed {
                        id: "simulador-preco",
                        name: "Simular preço e margem antes de publicar",
                        description: "Cenários com taxas e impostos",
                    },
                    OutcomeSeed {
                        id: "detectar-custos-ocultos",
                        name: "Detectar custos ocultos automaticamente",
                        description: "Identificar tarifas não previstas",
                    },
                ],
            },
        ],
    },
];

const BASELINE_SCORES: &[Rating] = &[
    ("tempo-atributos", 9.3, 4.6),
    ("taxa-aprovacao", 9.0, 5.2),
    ("visibilidade-busca", 9.6, 3.9),
    ("evitar-ruptura", 9.2, 6.1),
    ("sincronizar-multiplos", 9.0, 3.7),
    ("competitividade-preco", 9.0, 5.1),
    ("monitorar-concorrentes", 8.6, 4.4),
    ("custo-frete", 9.1, 5.0),
    ("prazo-entrega", 8.8, 4.5),
    ("rate-ocorrencias", 8.4, 4.2),
    ("tempo-picking", 8.2, 4.8),
    ("acuracia-previsao", 9.0, 4.1),
    ("leadtime-fornecedor", 8.3, 3.8),
    ("saldo-multicanal", 8.6, 4.0),
    ("priorizar-skus", 8.5, 4.3),
    ("tempo-primeira-resposta", 8.6, 5.0),
    ("taxa-reabertura", 8.1, 4.2),
    ("nps", 8.4, 4.7),
    ("volume-nota-reviews", 8.4, 4.1),
    ("tempo-conciliacao", 9.0, 4.6),
    ("lucro-por-pedido", 9.4, 4.4),
    ("simulador-preco", 9.1, 4.3),
    ("detectar-custos-ocultos", 8.5, 3.9),
];

/// (round id, importance delta, satisfaction delta). Rounds not listed shift by zero.
const ROUND_VARIATION: &[(&str, f64, f64)] = &[
    ("2024-1", -0.1, -0.2),
    ("2024-2", 0.0, 0.0),
    ("2025-1", -0.1, 0.2),
    ("2026-1", -0.2, 0.7),
    ("2026-2", -0.2, 0.9),
    ("2027-1", -0.3, 1.1),
];

/// Exact ratings that replace the derived ones. Not clamped.
const OVERRIDE_SCORES: &[(&str, &[Rating])] = &[
    (
        "2024-1",
        &[
            ("tempo-atributos", 9.2, 9.9),
            ("taxa-aprovacao", 8.7, 4.2),
            ("visibilidade-busca", 9.5, 3.1),
            ("evitar-ruptura", 9.1, 5.2),
            ("sincronizar-multiplos", 8.8, 2.9),
            ("competitividade-preco", 8.9, 4.1),
            ("monitorar-concorrentes", 8.3, 3.5),
        ],
    ),
    (
        "2024-2",
        &[
            ("tempo-atributos", 9.4, 4.1),
            ("taxa-aprovacao", 8.9, 4.8),
            ("visibilidade-busca", 9.7, 3.4),
            ("evitar-ruptura", 9.3, 5.8),
            ("sincronizar-multiplos", 9.1, 3.2),
            ("competitividade-preco", 9.0, 4.7),
            ("monitorar-concorrentes", 8.5, 4.0),
        ],
    ),
];

const ROUNDS_META: &[RoundMeta] = &[
    RoundMeta {
        id: "2024-1",
        name: "Pesquisa Jan/2024",
        date: "2024-01-01",
        description: "Primeira rodada de pesquisa ODI com vendedores de marketplace",
    },
    RoundMeta {
        id: "2024-2",
        name: "Pesquisa Jul/2024",
        date: "2024-07-01",
        description: "Segunda rodada de pesquisa ODI com maior amostra de vendedores",
    },
    RoundMeta {
        id: "2025-1",
        name: "Pesquisa Jan/2025",
        date: "2025-01-01",
        description: "Terceira rodada com foco em eficiência operacional e catalogação",
    },
    RoundMeta {
        id: "2025-2",
        name: "Pesquisa Jul/2025",
        date: "2025-07-01",
        description: "Quarta rodada com recorte em pricing dinâmico e promoções",
    },
    RoundMeta {
        id: "2026-1",
        name: "Pesquisa Jan/2026",
        date: "2026-01-01",
        description: "Quinta rodada com foco em finanças e rentabilidade",
    },
    RoundMeta {
        id: "2026-2",
        name: "Pesquisa Jul/2026",
        date: "2026-07-01",
        description: "Sexta rodada com foco em produtividade do time e automações",
    },
    RoundMeta {
        id: "2027-1",
        name: "Pesquisa Jan/2027",
        date: "2027-01-01",
        description: "Sétima rodada consolidando aprendizado e evolução longitudinal",
    },
];

/// Round to one decimal, then clamp into the rating window
fn clamp_rating(value: f64) -> f64 {
    let rounded = (value * 10.0).round() / 10.0;
    rounded.clamp(MIN_RATING, MAX_RATING)
}

fn round_scores(round_id: &str) -> HashMap<&'static str, (f64, f64)> {
    let (d_imp, d_sat) = ROUND_VARIATION
        .iter()
        .find(|(id, _, _)| *id == round_id)
        .map(|(_, di, ds)| (*di, *ds))
        .unwrap_or((0.0, 0.0));

    let mut scores: HashMap<&'static str, (f64, f64)> = BASELINE_SCORES
        .iter()
        .map(|(id, imp, sat)| (*id, (clamp_rating(imp + d_imp), clamp_rating(sat + d_sat))))
        .collect();

    if let Some((_, overrides)) = OVERRIDE_SCORES.iter().find(|(id, _)| *id == round_id) {
        for &(id, imp, sat) in overrides.iter() {
            scores.insert(id, (imp, sat));
        }
    }

    scores
}

fn build_tree(
    round_id: &str,
    scores: &HashMap<&'static str, (f64, f64)>,
) -> Result<JtbdData, DatasetError> {
    let mut big_jobs = Vec::with_capacity(BASE_JOBS.len());
    for bj in BASE_JOBS {
        let mut little_jobs = Vec::with_capacity(bj.little_jobs.len());
        for lj in bj.little_jobs {
            let mut outcomes = Vec::with_capacity(lj.outcomes.len());
            for oc in lj.outcomes {
                let (importance, satisfaction) =
                    *scores.get(oc.id).ok_or_else(|| DatasetError::MissingScore {
                        round: round_id.to_string(),
                        outcome: oc.id.to_string(),
                    })?;
                outcomes.push(Outcome {
                    id: oc.id.to_string(),
                    name: oc.name.to_string(),
                    description: oc.description.to_string(),
                    importance,
                    satisfaction,
                });
            }
            little_jobs.push(LittleJob {
                id: lj.id.to_string(),
                name: lj.name.to_string(),
                description: lj.description.to_string(),
                outcomes,
            });
        }
        big_jobs.push(BigJob {
            id: bj.id.to_string(),
            name: bj.name.to_string(),
            description: bj.description.to_string(),
            little_jobs,
        });
    }
    Ok(JtbdData { big_jobs })
}

/// Build every round of the catalog.
pub fn build_rounds() -> Result<Vec<ResearchRound>, DatasetError> {
    ROUNDS_META
        .iter()
        .map(|meta| {
            let date = NaiveDate::parse_from_str(meta.date, "%Y-%m-%d").map_err(|source| {
                DatasetError::InvalidDate {
                    round: meta.id.to_string(),
                    source,
                }
            })?;
            let data = build_tree(meta.id, &round_scores(meta.id))?;
            tracing::debug!(
                round = meta.id,
                outcomes = data.outcome_count(),
                "built research round"
            );
            Ok(ResearchRound {
                id: meta.id.to_string(),
                name: meta.name.to_string(),
                date,
                description: meta.description.to_string(),
                data,
            })
        })
        .collect()
}

/// All research rounds, in catalog (chronological) order.
pub fn research_rounds() -> &'static [ResearchRound] {
    static ROUNDS: OnceLock<Vec<ResearchRound>> = OnceLock::new();
    ROUNDS.get_or_init(|| build_rounds().expect("embedded catalog is complete"))
}

pub fn find_round(id: &str) -> Option<&'static ResearchRound> {
    research_rounds().iter().find(|r| r.id == id)
}

/// The most recent round by date
pub fn latest_round() -> Option<&'static ResearchRound> {
    research_rounds().iter().max_by_key(|r| r.date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn ratings(round: &ResearchRound, outcome_id: &str) -> (f64, f64) {
        let o = round.data.find_outcome(outcome_id).unwrap();
        (o.importance, o.satisfaction)
    }

    fn close(a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9
    }

    #[test]
    fn test_catalog_shape() {
        let rounds = build_rounds().unwrap();
        assert_eq!(rounds.len(), 7);
        for round in &rounds {
            assert_eq!(round.data.big_jobs.len(), 6);
            assert_eq!(round.data.outcome_count(), 23);
        }
    }

    #[test]
    fn test_ids_unique_within_round() {
        let round = &research_rounds()[0];
        let mut seen = HashSet::new();
        for bj in &round.data.big_jobs {
            assert!(seen.insert(bj.id.clone()));
            for lj in &bj.little_jobs {
                assert!(seen.insert(lj.id.clone()));
                for o in &lj.outcomes {
                    assert!(seen.insert(o.id.clone()), "duplicate id {}", o.id);
                }
            }
        }
    }

    #[test]
    fn test_rounds_share_catalog() {
        let rounds = research_rounds();
        let ids = |r: &ResearchRound| -> Vec<String> {
            r.data
                .big_jobs
                .iter()
                .flat_map(|bj| bj.little_jobs.iter())
                .flat_map(|lj| lj.outcomes.iter())
                .map(|o| o.id.clone())
                .collect()
        };
        let first = ids(&rounds[0]);
        for round in &rounds[1..] {
            assert_eq!(ids(round), first);
        }
    }

    #[test]
    fn test_overrides_are_exact() {
        let r = find_round("2024-1").unwrap();
        // 9.9 is above the clamp window; overrides bypass it
        assert!(close(ratings(r, "tempo-atributos"), (9.2, 9.9)));

        let r = find_round("2024-2").unwrap();
        assert!(close(ratings(r, "evitar-ruptura"), (9.3, 5.8)));
    }

    #[test]
    fn test_derived_ratings_are_clamped() {
        // custo-frete baseline (9.1, 5.0), 2025-1 delta (-0.1, +0.2)
        let r = find_round("2025-1").unwrap();
        assert!(close(ratings(r, "custo-frete"), (9.0, 6.0)));

        // visibilidade-busca baseline importance 9.6 stays under the 9.7 cap
        let r = find_round("2025-2").unwrap();
        assert!(close(ratings(r, "visibilidade-busca"), (9.6, 6.0)));
    }

    #[test]
    fn test_round_without_delta_uses_baseline() {
        let r = find_round("2025-2").unwrap();
        assert!(close(ratings(r, "lucro-por-pedido"), (9.4, 6.0)));
        assert!(close(ratings(r, "nps"), (8.4, 6.0)));
    }

    #[test]
    fn test_later_round_shifts_satisfaction() {
        // tempo-primeira-resposta baseline (8.6, 5.0), 2027-1 delta (-0.3, +1.1)
        let r = find_round("2027-1").unwrap();
        assert!(close(ratings(r, "tempo-primeira-resposta"), (8.3, 6.1)));
    }

    #[test]
    fn test_clamp_rating() {
        assert_eq!(clamp_rating(5.2), 6.0);
        assert_eq!(clamp_rating(9.9), 9.7);
        assert!((clamp_rating(9.3 - 0.1) - 9.2).abs() < 1e-9);
    }

    #[test]
    fn test_latest_round() {
        assert_eq!(latest_round().unwrap().id, "2027-1");
    }

    #[test]
    fn test_find_round_missing() {
        assert!(find_round("1999-1").is_none());
    }
}
